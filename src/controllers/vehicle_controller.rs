use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateOdometerRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::{RecordWithStatus, Vehicle};
use crate::repositories::{MaintenanceRepository, NewVehicle, VehicleRepository};
use crate::services::alert_aggregator::AlertAggregator;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::validation::normalize_plate;

pub struct VehicleController {
    repository: VehicleRepository,
    maintenances: MaintenanceRepository,
}

impl VehicleController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            maintenances: MaintenanceRepository::new(pool),
        }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        let vehicle = self
            .repository
            .create(NewVehicle {
                brand: request.brand.trim().to_string(),
                model: request.model.trim().to_string(),
                plate: normalize_plate(&request.plate),
                year: request.year,
                current_km: request.current_km.unwrap_or(0),
            })
            .await?;

        info!("🚗 Vehículo creado: {} ({})", vehicle.plate, vehicle.id);

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle created".to_string(),
        ))
    }

    pub async fn list(&self) -> Result<Vec<Vehicle>, AppError> {
        self.repository.find_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        let vehicle = self
            .repository
            .update(
                id,
                request.brand.map(|b| b.trim().to_string()),
                request.model.map(|m| m.trim().to_string()),
                request.plate.as_deref().map(normalize_plate),
                request.year,
                request.current_km,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle updated".to_string(),
        ))
    }

    /// Actualiza el kilometraje; un valor inferior al actual se rechaza
    pub async fn update_odometer(
        &self,
        id: Uuid,
        request: UpdateOdometerRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        let current = self.get_by_id(id).await?;
        if request.current_km < current.current_km {
            return Err(AppError::BadRequest(format!(
                "Odometer reading {} is lower than the current {}; edit the vehicle to correct it",
                request.current_km, current.current_km
            )));
        }

        let vehicle = self.repository.update_odometer(id, request.current_km).await?;
        info!("📏 Kilometraje de {} actualizado a {}", vehicle.plate, vehicle.current_km);

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Odometer updated".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let removed = self.repository.delete(id).await?;
        info!("🗑️ Vehículo {} eliminado junto con {} manutenciones", id, removed);
        Ok(removed)
    }

    /// Manutenciones del vehículo en el orden del detalle, con su estado
    pub async fn list_maintenances(
        &self,
        id: Uuid,
        aggregator: &AlertAggregator,
        now: NaiveDateTime,
    ) -> Result<Vec<RecordWithStatus>, AppError> {
        let vehicle = self.get_by_id(id).await?;
        let records = self.maintenances.find_by_vehicle(id).await?;
        Ok(aggregator.order_vehicle_records(&vehicle, records, now))
    }
}
