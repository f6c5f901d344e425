//! Agregador de alertas
//!
//! Aplica el evaluador a todas las parejas (vehículo, manutención), descarta
//! las manutenciones completadas y devuelve una lista ordenada por prioridad.
//! No guarda estado: se vuelve a ejecutar cada vez que cambian los datos o la hora.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::{
    Alert, AlertSummary, DueState, MaintenanceRecord, RecordWithStatus, Vehicle,
};
use crate::services::due_status::DueStatusEvaluator;

#[derive(Debug, Clone, Default)]
pub struct AlertAggregator {
    evaluator: DueStatusEvaluator,
}

impl AlertAggregator {
    pub fn new(evaluator: DueStatusEvaluator) -> Self {
        Self { evaluator }
    }

    /// Alertas de todos los vehículos, ya ordenadas.
    ///
    /// Único punto donde se descartan las manutenciones completadas. Las
    /// manutenciones cuyo vehículo no está en `vehicles` se ignoran.
    pub fn aggregate(
        &self,
        vehicles: &[Vehicle],
        records: &[MaintenanceRecord],
        now: NaiveDateTime,
    ) -> Vec<Alert> {
        let by_vehicle = pending_by_vehicle(records);
        let mut alerts = Vec::new();

        for vehicle in vehicles {
            let Some(pending) = by_vehicle.get(&vehicle.id) else {
                continue;
            };

            for record in pending {
                let due = self.evaluator.evaluate(record, Some(vehicle.current_km), now);
                if due.is_due {
                    alerts.push(Alert {
                        vehicle: vehicle.clone(),
                        maintenance: (*record).clone(),
                        due,
                    });
                }
            }
        }

        self.rank(&mut alerts);
        alerts
    }

    /// Overdue antes que imminent; dentro de cada grupo, menor urgencia primero.
    /// El orden es estable para empates.
    pub fn rank(&self, alerts: &mut [Alert]) {
        alerts.sort_by(|a, b| {
            state_rank(a.due.status)
                .cmp(&state_rank(b.due.status))
                .then_with(|| {
                    self.evaluator
                        .urgency(&a.due)
                        .total_cmp(&self.evaluator.urgency(&b.due))
                })
        });
    }

    /// Orden del detalle de un vehículo: pendientes primero por días restantes,
    /// luego las completadas de la más reciente a la más antigua
    pub fn order_vehicle_records(
        &self,
        vehicle: &Vehicle,
        records: Vec<MaintenanceRecord>,
        now: NaiveDateTime,
    ) -> Vec<RecordWithStatus> {
        let mut items: Vec<RecordWithStatus> = records
            .into_iter()
            .filter(|r| r.vehicle_id == vehicle.id)
            .map(|record| {
                let due_status = if record.completed {
                    None
                } else {
                    Some(self.evaluator.evaluate(&record, Some(vehicle.current_km), now))
                };
                RecordWithStatus { record, due_status }
            })
            .collect();

        items.sort_by(compare_detail);
        items
    }

    /// Contadores globales para el panel
    pub fn summarize(
        &self,
        vehicles: &[Vehicle],
        records: &[MaintenanceRecord],
        now: NaiveDateTime,
    ) -> AlertSummary {
        let alerts = self.aggregate(vehicles, records, now);
        AlertSummary {
            total_vehicles: vehicles.len(),
            total_maintenances: records.len(),
            active_alerts: alerts.len(),
            overdue_alerts: alerts
                .iter()
                .filter(|a| a.due.status == DueState::Overdue)
                .count(),
        }
    }
}

/// Agrega con los umbrales por defecto
pub fn aggregate(
    vehicles: &[Vehicle],
    records: &[MaintenanceRecord],
    now: NaiveDateTime,
) -> Vec<Alert> {
    AlertAggregator::default().aggregate(vehicles, records, now)
}

fn pending_by_vehicle(records: &[MaintenanceRecord]) -> HashMap<Uuid, Vec<&MaintenanceRecord>> {
    let mut map: HashMap<Uuid, Vec<&MaintenanceRecord>> = HashMap::new();
    for record in records.iter().filter(|r| !r.completed) {
        map.entry(record.vehicle_id).or_default().push(record);
    }
    map
}

fn state_rank(state: DueState) -> u8 {
    match state {
        DueState::Overdue => 0,
        DueState::Imminent => 1,
        DueState::None => 2,
    }
}

fn compare_detail(a: &RecordWithStatus, b: &RecordWithStatus) -> Ordering {
    match (a.record.completed, b.record.completed) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        // más reciente primero; sin fecha al final
        (true, true) => b.record.completed_at.cmp(&a.record.completed_at),
        (false, false) => {
            let days = |item: &RecordWithStatus| {
                item.due_status
                    .as_ref()
                    .map(|s| s.days_until_or_infinity())
                    .unwrap_or(f64::INFINITY)
            };
            days(a).total_cmp(&days(b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn vehicle(current_km: i64) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            brand: "Fiat".to_string(),
            model: "Panda".to_string(),
            plate: "AB123CD".to_string(),
            year: Some(2018),
            current_km,
            created_at: Utc::now(),
        }
    }

    fn record(vehicle: &Vehicle, days: Option<i64>, due_km: Option<i64>) -> MaintenanceRecord {
        MaintenanceRecord {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            maintenance_type: "Revisione".to_string(),
            due_date: days.map(|d| now().date() + Duration::days(d)),
            due_km,
            notify_days_before: 7,
            notes: None,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_overdue_before_imminent() {
        let v = vehicle(10_000);
        let imminent = record(&v, Some(3), None);
        let overdue = record(&v, Some(-2), None);

        let alerts = aggregate(&[v], &[imminent.clone(), overdue.clone()], now());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].maintenance.id, overdue.id);
        assert_eq!(alerts[1].maintenance.id, imminent.id);
    }

    #[test]
    fn test_mixed_units_ranking() {
        let v = vehicle(50_000);
        let by_date = record(&v, Some(5), None);
        let by_km = record(&v, None, Some(50_100));

        let alerts = aggregate(&[v], &[by_date.clone(), by_km.clone()], now());
        assert_eq!(alerts[0].maintenance.id, by_km.id);
        assert_eq!(alerts[1].maintenance.id, by_date.id);
    }

    #[test]
    fn test_completed_records_never_alert() {
        let v = vehicle(10_000);
        let mut done = record(&v, Some(-30), None);
        done.completed = true;
        done.completed_at = Some(Utc::now());

        let alerts = aggregate(&[v], &[done], now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_only_due_records_are_kept() {
        let v = vehicle(10_000);
        let far = record(&v, Some(90), Some(80_000));
        let incomplete = record(&v, None, None);
        let alerts = aggregate(&[v], &[far, incomplete], now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_uses_each_vehicle_odometer() {
        let low = vehicle(10_000);
        let high = vehicle(59_000);
        let r_low = record(&low, None, Some(60_000));
        let r_high = record(&high, None, Some(60_000));

        let alerts = aggregate(&[low, high.clone()], &[r_low, r_high.clone()], now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].vehicle.id, high.id);
        assert_eq!(alerts[0].due.km_until, Some(1_000));
    }

    #[test]
    fn test_orphan_records_are_ignored() {
        let v = vehicle(10_000);
        let other = vehicle(0);
        let orphan = record(&other, Some(-1), None);
        assert!(aggregate(&[v], &[orphan], now()).is_empty());
    }

    #[test]
    fn test_flat_list_across_vehicles() {
        let a = vehicle(0);
        let b = vehicle(0);
        let ra = record(&a, Some(1), None);
        let rb = record(&b, Some(-1), None);
        let alerts = aggregate(&[a, b.clone()], &[ra, rb], now());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].vehicle.id, b.id);
    }

    #[test]
    fn test_detail_order() {
        let v = vehicle(0);
        let mut old_done = record(&v, Some(-40), None);
        old_done.completed = true;
        old_done.completed_at = Some(Utc::now() - Duration::days(10));
        let mut recent_done = record(&v, Some(-20), None);
        recent_done.completed = true;
        recent_done.completed_at = Some(Utc::now());
        let soon = record(&v, Some(2), None);
        let later = record(&v, Some(60), None);
        let km_only = record(&v, None, Some(100_000));

        let ordered = AlertAggregator::default().order_vehicle_records(
            &v,
            vec![old_done.clone(), km_only.clone(), later.clone(), recent_done.clone(), soon.clone()],
            now(),
        );
        let ids: Vec<Uuid> = ordered.iter().map(|i| i.record.id).collect();
        assert_eq!(ids, vec![soon.id, later.id, km_only.id, recent_done.id, old_done.id]);
        assert!(ordered[3].due_status.is_none());
        assert!(ordered[0].due_status.as_ref().unwrap().is_due);
    }

    #[test]
    fn test_summary_counts() {
        let v = vehicle(0);
        let overdue = record(&v, Some(-1), None);
        let imminent = record(&v, Some(1), None);
        let quiet = record(&v, Some(100), None);
        let summary = AlertAggregator::default().summarize(&[v], &[overdue, imminent, quiet], now());
        assert_eq!(
            summary,
            AlertSummary {
                total_vehicles: 1,
                total_maintenances: 3,
                active_alerts: 2,
                overdue_alerts: 1,
            }
        );
    }
}
