use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::MaintenanceRecord;
use crate::utils::errors::{not_found_error, AppError};

/// Datos ya validados para insertar una manutención
#[derive(Debug, Clone)]
pub struct NewMaintenance {
    pub vehicle_id: Uuid,
    pub maintenance_type: String,
    pub due_date: Option<NaiveDate>,
    pub due_km: Option<i64>,
    pub notify_days_before: i64,
    pub notes: Option<String>,
    pub completed: bool,
}

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: SqlitePool,
}

impl MaintenanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewMaintenance) -> Result<MaintenanceRecord, AppError> {
        let now = Utc::now();
        let completed_at = new.completed.then_some(now);

        let record = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO maintenances
                (id, vehicle_id, maintenance_type, due_date, due_km, notify_days_before,
                 notes, completed, completed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.vehicle_id)
        .bind(new.maintenance_type)
        .bind(new.due_date)
        .bind(new.due_km)
        .bind(new.notify_days_before)
        .bind(new.notes)
        .bind(new.completed)
        .bind(completed_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn find_all(&self) -> Result<Vec<MaintenanceRecord>, AppError> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenances ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn find_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<MaintenanceRecord>, AppError> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenances WHERE vehicle_id = $1 ORDER BY created_at ASC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRecord>, AppError> {
        let record = sqlx::query_as::<_, MaintenanceRecord>("SELECT * FROM maintenances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Guarda todos los campos editables; `vehicle_id` y `created_at` no se tocan
    pub async fn save(&self, record: &MaintenanceRecord) -> Result<MaintenanceRecord, AppError> {
        sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            UPDATE maintenances
            SET maintenance_type = $2, due_date = $3, due_km = $4, notify_days_before = $5,
                notes = $6, completed = $7, completed_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.maintenance_type)
        .bind(record.due_date)
        .bind(record.due_km)
        .bind(record.notify_days_before)
        .bind(&record.notes)
        .bind(record.completed)
        .bind(record.completed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Maintenance", &record.id.to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM maintenances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Maintenance", &id.to_string()));
        }

        Ok(())
    }
}
