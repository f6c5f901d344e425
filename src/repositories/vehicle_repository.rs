use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Vehicle;
use crate::utils::errors::{conflict_error, not_found_error, AppError};

/// Datos ya validados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub plate: String,
    pub year: Option<i32>,
    pub current_km: i64,
}

#[derive(Clone)]
pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewVehicle) -> Result<Vehicle, AppError> {
        let plate = new.plate.clone();

        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, brand, model, plate, year, current_km, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.brand)
        .bind(new.model)
        .bind(new.plate)
        .bind(new.year)
        .bind(new.current_km)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| plate_conflict(e, &plate))
    }

    pub async fn find_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    /// Actualización parcial: los campos `None` conservan el valor actual
    pub async fn update(
        &self,
        id: Uuid,
        brand: Option<String>,
        model: Option<String>,
        plate: Option<String>,
        year: Option<i32>,
        current_km: Option<i64>,
    ) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        let plate = plate.unwrap_or(current.plate);

        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET brand = $2, model = $3, plate = $4, year = $5, current_km = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(brand.unwrap_or(current.brand))
        .bind(model.unwrap_or(current.model))
        .bind(&plate)
        .bind(year.or(current.year))
        .bind(current_km.unwrap_or(current.current_km))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| plate_conflict(e, &plate))
    }

    pub async fn update_odometer(&self, id: Uuid, current_km: i64) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>("UPDATE vehicles SET current_km = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(current_km)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    /// Borra el vehículo y sus manutenciones en una sola transacción
    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM maintenances WHERE vehicle_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(not_found_error("Vehicle", &id.to_string()));
        }

        tx.commit().await?;
        Ok(removed)
    }
}

fn plate_conflict(e: sqlx::Error, plate: &str) -> AppError {
    AppError::from_unique_violation(e, conflict_error("Vehicle", "plate", plate))
}
