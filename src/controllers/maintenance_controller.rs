use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::maintenance_dto::{
    CompletionRequest, CreateMaintenanceRequest, UpdateMaintenanceRequest,
};
use crate::dto::ApiResponse;
use crate::models::maintenance::DEFAULT_NOTIFY_DAYS_BEFORE;
use crate::models::MaintenanceRecord;
use crate::repositories::{MaintenanceRepository, NewMaintenance, VehicleRepository};
use crate::utils::errors::{not_found_error, validation_error, AppError};
use crate::utils::validation::require_due_criterion;

pub struct MaintenanceController {
    repository: MaintenanceRepository,
    vehicles: VehicleRepository,
}

impl MaintenanceController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: MaintenanceRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    /// Crea una manutención. `vehicle_id` del path tiene prioridad sobre el del body.
    pub async fn create(
        &self,
        vehicle_id: Option<Uuid>,
        request: CreateMaintenanceRequest,
    ) -> Result<ApiResponse<MaintenanceRecord>, AppError> {
        request.validate()?;
        require_due_criterion(request.due_date, request.due_km)?;

        let vehicle_id = vehicle_id
            .or(request.vehicle_id)
            .ok_or_else(|| validation_error("vehicle_id", "vehicle_id is required"))?;

        if !self.vehicles.exists(vehicle_id).await? {
            return Err(not_found_error("Vehicle", &vehicle_id.to_string()));
        }

        let record = self
            .repository
            .create(NewMaintenance {
                vehicle_id,
                maintenance_type: request.maintenance_type.trim().to_string(),
                due_date: request.due_date,
                due_km: request.due_km,
                notify_days_before: request
                    .notify_days_before
                    .unwrap_or(DEFAULT_NOTIFY_DAYS_BEFORE),
                notes: request.notes.filter(|n| !n.trim().is_empty()),
                completed: request.completed.unwrap_or(false),
            })
            .await?;

        info!("🔧 Manutención '{}' creada para el vehículo {}", record.maintenance_type, vehicle_id);

        Ok(ApiResponse::success_with_message(
            record,
            "Maintenance created".to_string(),
        ))
    }

    pub async fn list(&self) -> Result<Vec<MaintenanceRecord>, AppError> {
        self.repository.find_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<MaintenanceRecord, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Maintenance", &id.to_string()))
    }

    /// Actualización parcial; el registro resultante debe seguir teniendo fecha o km
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateMaintenanceRequest,
    ) -> Result<ApiResponse<MaintenanceRecord>, AppError> {
        request.validate()?;
        if let Some(Some(km)) = request.due_km {
            if km < 0 {
                return Err(validation_error("due_km", "due_km must not be negative"));
            }
        }

        let mut record = self.get_by_id(id).await?;

        if let Some(maintenance_type) = request.maintenance_type {
            record.maintenance_type = maintenance_type.trim().to_string();
        }
        if let Some(due_date) = request.due_date {
            record.due_date = due_date;
        }
        if let Some(due_km) = request.due_km {
            record.due_km = due_km;
        }
        if let Some(days) = request.notify_days_before {
            record.notify_days_before = days;
        }
        if let Some(notes) = request.notes {
            record.notes = notes.filter(|n| !n.trim().is_empty());
        }
        if let Some(completed) = request.completed {
            record.set_completed(completed, request.completed_at, Utc::now());
        }

        require_due_criterion(record.due_date, record.due_km)?;

        let saved = self.repository.save(&record).await?;
        Ok(ApiResponse::success_with_message(
            saved,
            "Maintenance updated".to_string(),
        ))
    }

    pub async fn set_completion(
        &self,
        id: Uuid,
        request: CompletionRequest,
    ) -> Result<ApiResponse<MaintenanceRecord>, AppError> {
        let mut record = self.get_by_id(id).await?;
        record.set_completed(request.completed, request.completed_at, Utc::now());

        let saved = self.repository.save(&record).await?;
        info!(
            "✅ Manutención {} marcada como {}",
            id,
            if saved.completed { "completada" } else { "pendiente" }
        );

        Ok(ApiResponse::success(saved))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete(id).await
    }
}
