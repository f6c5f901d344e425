use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::deserialize_some;
use crate::utils::validation::validate_not_blank;

// Request para crear una manutención.
// `vehicle_id` sólo se usa en POST /api/maintenances; la ruta anidada lo toma del path.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub vehicle_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub maintenance_type: String,

    pub due_date: Option<NaiveDate>,

    #[validate(range(min = 0))]
    pub due_km: Option<i64>,

    #[validate(range(min = 0, max = 365))]
    pub notify_days_before: Option<i64>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    pub completed: Option<bool>,
}

// Request para actualizar una manutención.
// En los campos anulables, ausente = sin cambios y `null` = borrar el valor.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub maintenance_type: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_km: Option<Option<i64>>,

    #[validate(range(min = 0, max = 365))]
    pub notify_days_before: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,

    pub completed: Option<bool>,

    /// Fecha de realización indicada por el cliente; sólo cuenta si `completed` pasa a true
    pub completed_at: Option<DateTime<Utc>>,
}

/// Request para marcar o desmarcar una manutención como completada
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}
