//! Repositorios
//!
//! Acceso a las tablas `vehicles` y `maintenances`. Son la única parte del
//! código que escribe SQL.

pub mod maintenance_repository;
pub mod vehicle_repository;

pub use maintenance_repository::{MaintenanceRepository, NewMaintenance};
pub use vehicle_repository::{NewVehicle, VehicleRepository};

use sqlx::SqlitePool;

use crate::models::{MaintenanceRecord, Vehicle};
use crate::utils::errors::AppError;

/// Vehículos y manutenciones leídos al inicio de un ciclo de evaluación
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub vehicles: Vec<Vehicle>,
    pub records: Vec<MaintenanceRecord>,
}

impl FleetSnapshot {
    pub async fn load(pool: &SqlitePool) -> Result<Self, AppError> {
        let vehicles = VehicleRepository::new(pool.clone());
        let maintenances = MaintenanceRepository::new(pool.clone());

        let (vehicles, records) = tokio::try_join!(vehicles.find_all(), maintenances.find_all())?;
        Ok(Self { vehicles, records })
    }
}
