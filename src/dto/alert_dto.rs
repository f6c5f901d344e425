use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// `?at=2025-06-10T09:30:00` evalúa en ese instante en lugar de ahora
#[derive(Debug, Default, Deserialize)]
pub struct EvaluationQuery {
    pub at: Option<NaiveDateTime>,
}

impl EvaluationQuery {
    /// Instante de evaluación: `at` o la hora local actual
    pub fn now(&self) -> NaiveDateTime {
        self.at.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// Estado del notificador en segundo plano
#[derive(Debug, Clone, Serialize)]
pub struct NotificationStatusResponse {
    pub enabled: bool,
    pub check_interval_minutes: u64,
    pub sink: String,
    pub sent_today: usize,
    pub last_check: Option<NaiveDateTime>,
}

/// Resultado de un ciclo de comprobación forzado
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub alerts: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}
