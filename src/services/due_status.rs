//! Evaluador de vencimientos
//!
//! Función pura que decide si una manutención está vencida, próxima a vencer
//! o fuera de plazo. Es la única implementación de estas reglas: la usan las
//! rutas HTTP, el listado por vehículo y el notificador en segundo plano.
//!
//! El reloj entra sólo por el parámetro `now` (hora local sin zona), así que
//! dos llamadas con los mismos datos devuelven exactamente lo mismo.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{DueState, DueStatus, MaintenanceRecord};

/// Umbral de kilómetros a partir del cual una manutención es "imminent"
pub const DEFAULT_IMMINENT_KM: i64 = 3000;

/// Kilómetros que equivalen a un día de uso para ordenar alertas
pub const KM_PER_DAY: i64 = 50;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Separador entre el motivo por fecha y el motivo por kilometraje
pub const REASON_SEPARATOR: &str = " | ";

/// Umbrales configurables de la evaluación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueThresholds {
    pub imminent_km: i64,
    pub km_per_day: i64,
}

impl Default for DueThresholds {
    fn default() -> Self {
        Self {
            imminent_km: DEFAULT_IMMINENT_KM,
            km_per_day: KM_PER_DAY,
        }
    }
}

/// Contribución de un criterio (fecha o kilometraje)
#[derive(Debug, Clone, PartialEq)]
struct Contribution {
    state: DueState,
    reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct DueStatusEvaluator {
    thresholds: DueThresholds,
}

impl DueStatusEvaluator {
    pub fn new(thresholds: DueThresholds) -> Self {
        Self { thresholds }
    }

    /// Evalúa una manutención con el kilometraje actual de su vehículo.
    ///
    /// No mira `completed`: filtrar las manutenciones completadas es tarea
    /// del agregador.
    pub fn evaluate(
        &self,
        record: &MaintenanceRecord,
        current_km: Option<i64>,
        now: NaiveDateTime,
    ) -> DueStatus {
        let mut status = DueStatus::not_due();
        let mut contributions: Vec<Contribution> = Vec::with_capacity(2);

        if let Some(due_date) = record.due_date {
            let days = days_until(due_date, now);
            status.days_until = Some(days);
            if let Some(c) = date_contribution(days, record.notify_days_before) {
                contributions.push(c);
            }
        }

        if let (Some(due_km), Some(current)) = (record.due_km, current_km) {
            let km = due_km - current;
            status.km_until = Some(km);
            if let Some(c) = km_contribution(km, self.thresholds.imminent_km) {
                contributions.push(c);
            }
        }

        if contributions.is_empty() {
            return status;
        }

        status.is_due = true;
        status.status = contributions
            .iter()
            .fold(DueState::None, |acc, c| acc.combine(c.state));
        status.reason = contributions
            .into_iter()
            .map(|c| c.reason)
            .collect::<Vec<_>>()
            .join(REASON_SEPARATOR);
        status
    }

    /// Urgencia para ordenar: `min(days_until, km_until / km_per_day)`,
    /// con `+∞` para el criterio que falte
    pub fn urgency(&self, status: &DueStatus) -> f64 {
        let by_km = status
            .km_until
            .map(|km| km as f64 / self.thresholds.km_per_day as f64)
            .unwrap_or(f64::INFINITY);
        status.days_until_or_infinity().min(by_km)
    }
}

/// Evalúa con los umbrales por defecto (3000 km, 50 km/día)
pub fn evaluate(record: &MaintenanceRecord, current_km: Option<i64>, now: NaiveDateTime) -> DueStatus {
    DueStatusEvaluator::default().evaluate(record, current_km, now)
}

/// Días (redondeando hacia arriba) desde `now` hasta la medianoche de `due_date`.
/// Cualquier instante del mismo día de vencimiento da 0.
pub fn days_until(due_date: NaiveDate, now: NaiveDateTime) -> i64 {
    let anchor = due_date.and_time(NaiveTime::default());
    let diff = (anchor - now).num_milliseconds();
    let days = diff.div_euclid(MILLIS_PER_DAY);
    if diff.rem_euclid(MILLIS_PER_DAY) != 0 {
        days + 1
    } else {
        days
    }
}

fn date_contribution(days: i64, notify_days_before: i64) -> Option<Contribution> {
    if days < 0 {
        let overdue = days.abs();
        Some(Contribution {
            state: DueState::Overdue,
            reason: format!("overdue by {} {}", overdue, day_word(overdue)),
        })
    } else if days <= notify_days_before {
        let reason = if days == 0 {
            "due today".to_string()
        } else {
            format!("due in {} {}", days, day_word(days))
        };
        Some(Contribution {
            state: DueState::Imminent,
            reason,
        })
    } else {
        None
    }
}

fn km_contribution(km_until: i64, imminent_km: i64) -> Option<Contribution> {
    if km_until < 0 {
        Some(Contribution {
            state: DueState::Overdue,
            reason: format!("exceeded by {} km", km_until.abs()),
        })
    } else if km_until <= imminent_km {
        Some(Contribution {
            state: DueState::Imminent,
            reason: format!("{} km remaining", km_until),
        })
    } else {
        None
    }
}

fn day_word(n: i64) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}
