//! Tipos derivados de la evaluación de vencimientos
//!
//! Se calculan en cada evaluación y no se guardan nunca en la base de datos.

use serde::{Deserialize, Serialize};

use crate::models::{MaintenanceRecord, Vehicle};

/// Estado de vencimiento de una manutención
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueState {
    None,
    Imminent,
    Overdue,
}

impl DueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueState::None => "none",
            DueState::Imminent => "imminent",
            DueState::Overdue => "overdue",
        }
    }

    /// Combina dos contribuciones: overdue domina sobre imminent, imminent sobre none
    pub fn combine(self, other: DueState) -> DueState {
        match (self, other) {
            (DueState::Overdue, _) | (_, DueState::Overdue) => DueState::Overdue,
            (DueState::Imminent, _) | (_, DueState::Imminent) => DueState::Imminent,
            _ => DueState::None,
        }
    }
}

/// Resultado de evaluar una manutención en un instante dado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueStatus {
    pub is_due: bool,
    pub status: DueState,
    /// `None` cuando no hay fecha de vencimiento (infinitamente lejos)
    pub days_until: Option<i64>,
    pub km_until: Option<i64>,
    pub reason: String,
}

impl DueStatus {
    /// Estado de una manutención sin ningún criterio aplicable
    pub fn not_due() -> Self {
        Self {
            is_due: false,
            status: DueState::None,
            days_until: None,
            km_until: None,
            reason: String::new(),
        }
    }

    /// Días hasta el vencimiento como `f64`, `+∞` sin fecha
    pub fn days_until_or_infinity(&self) -> f64 {
        self.days_until.map(|d| d as f64).unwrap_or(f64::INFINITY)
    }
}

/// Alerta: vehículo, manutención y su estado de vencimiento
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub vehicle: Vehicle,
    pub maintenance: MaintenanceRecord,
    #[serde(flatten)]
    pub due: DueStatus,
}

/// Manutención de un vehículo con su estado; `None` si está completada
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordWithStatus {
    #[serde(flatten)]
    pub record: MaintenanceRecord,
    pub due_status: Option<DueStatus>,
}

/// Contadores del panel principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub total_vehicles: usize,
    pub total_maintenances: usize,
    pub active_alerts: usize,
    pub overdue_alerts: usize,
}
