//! Modelo de Vehicle
//!
//! Mapea exactamente a la tabla `vehicles`. La matrícula se guarda siempre
//! en mayúsculas y es única.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub plate: String,
    pub year: Option<i32>,
    /// Kilometraje actual, nunca negativo
    pub current_km: i64,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Nombre corto para mensajes: "marca modelo"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}
