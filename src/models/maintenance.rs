//! Modelo de MaintenanceRecord
//!
//! Mapea a la tabla `maintenances`. `vehicle_id` no cambia después de la
//! creación; `completed_at` sólo existe mientras `completed` es verdadero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Días de preaviso cuando la petición no indica ninguno
pub const DEFAULT_NOTIFY_DAYS_BEFORE: i64 = 7;

/// Manutención programada de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub maintenance_type: String,
    pub due_date: Option<NaiveDate>,
    pub due_km: Option<i64>,
    pub notify_days_before: i64,
    pub notes: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    /// Sin fecha ni kilometraje la manutención no es evaluable
    pub fn has_due_criterion(&self) -> bool {
        self.due_date.is_some() || self.due_km.is_some()
    }

    /// Aplica el cambio de estado completado.
    ///
    /// Al completar se usa `at`, si no la fecha ya guardada, si no `now`.
    /// Al revertir, `completed_at` se borra.
    pub fn set_completed(&mut self, completed: bool, at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.completed_at = if completed {
            Some(at.or(self.completed_at).unwrap_or(now))
        } else {
            None
        };
        self.completed = completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record() -> MaintenanceRecord {
        MaintenanceRecord {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            maintenance_type: "Bollo".to_string(),
            due_date: None,
            due_km: None,
            notify_days_before: DEFAULT_NOTIFY_DAYS_BEFORE,
            notes: None,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_completion_toggle() {
        let now = Utc::now();
        let mut r = record();

        r.set_completed(true, None, now);
        assert!(r.completed);
        assert_eq!(r.completed_at, Some(now));

        // completar de nuevo conserva la fecha original
        r.set_completed(true, None, now + Duration::days(1));
        assert_eq!(r.completed_at, Some(now));

        r.set_completed(false, None, now);
        assert!(!r.completed);
        assert_eq!(r.completed_at, None);
    }

    #[test]
    fn test_completion_with_explicit_date() {
        let now = Utc::now();
        let done_at = now - Duration::days(3);
        let mut r = record();
        r.set_completed(true, Some(done_at), now);
        assert_eq!(r.completed_at, Some(done_at));
    }

    #[test]
    fn test_has_due_criterion() {
        let mut r = record();
        assert!(!r.has_due_criterion());
        r.due_km = Some(10_000);
        assert!(r.has_due_criterion());
    }
}
