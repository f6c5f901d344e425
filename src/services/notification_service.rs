//! Notificador en segundo plano
//!
//! Cada ciclo lee una instantánea de la flota, calcula las alertas con el
//! agregador y entrega una notificación por alerta que el de-duplicador aún
//! no haya visto hoy. Si la lectura falla, el ciclo se salta y se reintenta
//! en el siguiente intervalo.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::environment::NotificationConfig;
use crate::dto::alert_dto::{CheckResponse, NotificationStatusResponse};
use crate::models::{Alert, DueState};
use crate::repositories::FleetSnapshot;
use crate::services::alert_aggregator::AlertAggregator;
use crate::services::notification_dedup::{NotificationDeduplicator, SentLog, SentLogFile};
use crate::utils::errors::AppError;

/// Notificación lista para entregar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub require_interaction: bool,
    pub status: DueState,
    pub vehicle_id: Uuid,
    pub maintenance_id: Uuid,
}

impl Notification {
    pub fn from_alert(alert: &Alert) -> Self {
        let overdue = alert.due.status == DueState::Overdue;
        let title = if overdue {
            "Maintenance overdue"
        } else {
            "Maintenance due soon"
        };

        Self {
            title: title.to_string(),
            body: format!(
                "{} - {}\n{}",
                alert.maintenance.maintenance_type,
                alert.vehicle.display_name(),
                alert.due.reason
            ),
            tag: format!("maintenance-{}", alert.maintenance.id),
            require_interaction: overdue,
            status: alert.due.status,
            vehicle_id: alert.vehicle.id,
            maintenance_id: alert.maintenance.id,
        }
    }
}

/// Canal de entrega de notificaciones
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, notification: &Notification) -> Result<(), AppError>;
}

/// Escribe cada notificación como evento de `tracing`
#[derive(Debug, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), AppError> {
        info!(
            target: "autotrack::notifications",
            tag = %notification.tag,
            status = notification.status.as_str(),
            "🔔 {}: {}",
            notification.title,
            notification.body.replace('\n', " - ")
        );
        Ok(())
    }
}

/// Envía cada notificación como JSON por POST a una URL
#[derive(Debug, Clone)]
pub struct WebhookNotificationSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotificationSink {
    /// Cliente con timeout: un endpoint que no responde cuenta como entrega fallida
    pub fn new(url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("cannot build webhook client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "webhook responded with {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CheckState {
    dedup: NotificationDeduplicator,
    last_check: Option<NaiveDateTime>,
}

pub struct NotificationService {
    pool: SqlitePool,
    aggregator: AlertAggregator,
    sink: Arc<dyn NotificationSink>,
    sent_log: Option<SentLogFile>,
    config: NotificationConfig,
    state: Mutex<CheckState>,
    // Serializa los ciclos; `state` sólo se bloquea en tramos cortos
    cycle: Mutex<()>,
}

impl NotificationService {
    pub fn new(
        pool: SqlitePool,
        aggregator: AlertAggregator,
        sink: Arc<dyn NotificationSink>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            pool,
            aggregator,
            sink,
            sent_log: config.sent_log_path.clone().map(SentLogFile::new),
            config,
            state: Mutex::new(CheckState::default()),
            cycle: Mutex::new(()),
        }
    }

    /// Recupera el registro de hoy desde disco; un fallo equivale a "nada enviado"
    pub async fn restore(&self, now: NaiveDateTime) {
        let Some(file) = &self.sent_log else {
            return;
        };

        match file.load().await {
            Ok(Some(log)) => {
                let mut state = self.state.lock().await;
                state.dedup = NotificationDeduplicator::from_log(log, now.date());
                info!(
                    "📂 Registro de notificaciones restaurado ({} hoy)",
                    state.dedup.sent_today(now)
                );
            }
            Ok(None) => debug!("Sin registro previo de notificaciones en {}", file.path().display()),
            Err(e) => warn!("⚠️ No se pudo leer el registro de notificaciones: {:#}", e),
        }
    }

    /// Ejecuta un ciclo completo de comprobación en el instante `now`
    pub async fn run_check(&self, now: NaiveDateTime) -> Result<CheckResponse, AppError> {
        let _cycle = self.cycle.lock().await;

        let snapshot = FleetSnapshot::load(&self.pool).await?;
        let alerts = self
            .aggregator
            .aggregate(&snapshot.vehicles, &snapshot.records, now);

        let pending: Vec<&Alert> = {
            let state = self.state.lock().await;
            alerts
                .iter()
                .filter(|alert| state.dedup.should_notify(alert.maintenance.id, now))
                .collect()
        };

        let mut result = CheckResponse {
            alerts: alerts.len(),
            delivered: 0,
            skipped: alerts.len() - pending.len(),
            failed: 0,
        };

        for alert in pending {
            let id = alert.maintenance.id;
            match self.sink.deliver(&Notification::from_alert(alert)).await {
                Ok(()) => {
                    self.state.lock().await.dedup.mark_sent(id, now);
                    result.delivered += 1;
                }
                Err(e) => {
                    error!("❌ Error entregando la notificación de {}: {}", id, e);
                    result.failed += 1;
                }
            }
        }

        let sent_log = {
            let mut state = self.state.lock().await;
            state.last_check = Some(now);
            state.dedup.snapshot()
        };

        if result.delivered > 0 {
            self.persist(sent_log).await;
        }

        info!(
            "🔔 Comprobación completada: {} alertas, {} enviadas, {} ya notificadas, {} fallidas",
            result.alerts, result.delivered, result.skipped, result.failed
        );
        Ok(result)
    }

    pub async fn status(&self, now: NaiveDateTime) -> NotificationStatusResponse {
        let state = self.state.lock().await;
        NotificationStatusResponse {
            enabled: self.config.enabled,
            check_interval_minutes: self.config.check_interval.as_secs() / 60,
            sink: self.sink.name().to_string(),
            sent_today: state.dedup.sent_today(now),
            last_check: state.last_check,
        }
    }

    /// Lanza el ciclo periódico con la hora local
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.check_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                debug!("🔔 Controlando manutenciones...");
                if let Err(e) = self.run_check(Local::now().naive_local()).await {
                    warn!("⚠️ Ciclo de notificaciones omitido: {}", e);
                }
            }
        })
    }

    async fn persist(&self, sent_log: Option<SentLog>) {
        let (Some(file), Some(log)) = (&self.sent_log, sent_log) else {
            return;
        };

        if let Err(e) = file.save(&log).await {
            warn!("⚠️ No se pudo guardar el registro de notificaciones: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConnection;
    use crate::repositories::{MaintenanceRepository, NewMaintenance, NewVehicle, VehicleRepository};
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use chrono::{Duration, NaiveDate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration as StdDuration;
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct RecordingSink {
        delivered: StdMutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(&self, notification: &Notification) -> Result<(), AppError> {
            self.delivered.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn deliver(&self, _notification: &Notification) -> Result<(), AppError> {
            Err(AppError::ExternalApi("unreachable".to_string()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn config() -> NotificationConfig {
        NotificationConfig {
            sent_log_path: None,
            ..NotificationConfig::default()
        }
    }

    async fn seed(pool: &SqlitePool, completed: bool) -> Uuid {
        let vehicle = VehicleRepository::new(pool.clone())
            .create(NewVehicle {
                brand: "Alfa Romeo".to_string(),
                model: "Giulia".to_string(),
                plate: "GI123UL".to_string(),
                year: Some(2020),
                current_km: 30_000,
            })
            .await
            .unwrap();

        MaintenanceRepository::new(pool.clone())
            .create(NewMaintenance {
                vehicle_id: vehicle.id,
                maintenance_type: "Tagliando".to_string(),
                due_date: Some(now().date() - Duration::days(2)),
                due_km: None,
                notify_days_before: 7,
                notes: None,
                completed,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_notifies_once_per_day() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        let id = seed(db.pool(), false).await;
        let sink = Arc::new(RecordingSink::default());
        let service = NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            sink.clone(),
            config(),
        );

        let first = service.run_check(now()).await.unwrap();
        assert_eq!((first.alerts, first.delivered, first.skipped), (1, 1, 0));

        let second = service.run_check(now() + Duration::hours(2)).await.unwrap();
        assert_eq!((second.delivered, second.skipped), (0, 1));

        let next_day = service.run_check(now() + Duration::days(1)).await.unwrap();
        assert_eq!(next_day.delivered, 1);

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].maintenance_id, id);
        assert_eq!(delivered[0].title, "Maintenance overdue");
        assert!(delivered[0].require_interaction);
        assert_eq!(delivered[0].body, "Tagliando - Alfa Romeo Giulia\noverdue by 2 days");
    }

    #[tokio::test]
    async fn test_completed_records_are_not_notified() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        seed(db.pool(), true).await;
        let sink = Arc::new(RecordingSink::default());
        let service =
            NotificationService::new(db.pool().clone(), AlertAggregator::default(), sink.clone(), config());

        let result = service.run_check(now()).await.unwrap();
        assert_eq!(result.alerts, 0);
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        seed(db.pool(), false).await;
        let service = NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            Arc::new(FailingSink),
            config(),
        );

        let result = service.run_check(now()).await.unwrap();
        assert_eq!((result.delivered, result.failed), (0, 1));

        let status = service.status(now()).await;
        assert_eq!(status.sent_today, 0);
        assert_eq!(status.sink, "failing");
        assert_eq!(status.last_check, Some(now()));
    }

    #[tokio::test]
    async fn test_sent_log_survives_restart() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        seed(db.pool(), false).await;
        let path = std::env::temp_dir().join(format!("autotrack-notify-{}.json", Uuid::new_v4()));
        let config = NotificationConfig {
            sent_log_path: Some(path.clone()),
            ..NotificationConfig::default()
        };

        let first = NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            Arc::new(RecordingSink::default()),
            config.clone(),
        );
        assert_eq!(first.run_check(now()).await.unwrap().delivered, 1);

        let restarted = NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            Arc::new(RecordingSink::default()),
            config,
        );
        restarted.restore(now()).await;
        let result = restarted.run_check(now()).await.unwrap();
        assert_eq!((result.delivered, result.skipped), (0, 1));

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_unreadable_sent_log_is_ignored() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        seed(db.pool(), false).await;
        let path = std::env::temp_dir().join(format!("autotrack-notify-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, b"{broken").await.unwrap();

        let service = NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            Arc::new(RecordingSink::default()),
            NotificationConfig {
                sent_log_path: Some(path.clone()),
                ..NotificationConfig::default()
            },
        );
        service.restore(now()).await;
        assert_eq!(service.run_check(now()).await.unwrap().delivered, 1);

        tokio::fs::remove_file(&path).await.ok();
    }

    #[derive(Default)]
    struct WebhookState {
        calls: AtomicUsize,
        statuses: Vec<StatusCode>,
        received: StdMutex<Vec<serde_json::Value>>,
    }

    async fn webhook(
        State(hook): State<Arc<WebhookState>>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        hook.received.lock().unwrap().push(body);
        let call = hook.calls.fetch_add(1, Ordering::SeqCst);
        hook.statuses.get(call).copied().unwrap_or(StatusCode::OK)
    }

    /// Webhook local que responde con `statuses` en orden y después 200
    async fn spawn_webhook(statuses: Vec<StatusCode>) -> (String, Arc<WebhookState>) {
        let hook = Arc::new(WebhookState {
            statuses,
            ..WebhookState::default()
        });
        let app = Router::new()
            .route("/hook", post(webhook))
            .with_state(hook.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        (url, hook)
    }

    #[tokio::test]
    async fn test_webhook_error_status_is_retried_next_cycle() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        let id = seed(db.pool(), false).await;
        let (url, hook) = spawn_webhook(vec![
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::INTERNAL_SERVER_ERROR,
        ])
        .await;
        let sink = Arc::new(WebhookNotificationSink::new(url, StdDuration::from_secs(5)).unwrap());

        let notification = Notification {
            title: "Maintenance overdue".to_string(),
            body: "Tagliando - Alfa Romeo Giulia\noverdue by 2 days".to_string(),
            tag: format!("maintenance-{}", id),
            require_interaction: true,
            status: DueState::Overdue,
            vehicle_id: Uuid::new_v4(),
            maintenance_id: id,
        };
        let err = sink.deliver(&notification).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));

        let service = NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            sink,
            config(),
        );

        let failed = service.run_check(now()).await.unwrap();
        assert_eq!((failed.delivered, failed.failed), (0, 1));
        assert_eq!(service.status(now()).await.sent_today, 0);

        let retried = service.run_check(now() + Duration::minutes(30)).await.unwrap();
        assert_eq!((retried.delivered, retried.failed), (1, 0));
        assert_eq!(service.status(now()).await.sent_today, 1);

        let received = hook.received.lock().unwrap();
        assert_eq!(received.len(), 3);
        assert_eq!(received[2]["tag"], format!("maintenance-{}", id));
        assert_eq!(received[2]["require_interaction"], true);
        assert_eq!(received[2]["status"], "overdue");
    }

    #[tokio::test]
    async fn test_silent_webhook_times_out_without_blocking_status() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        seed(db.pool(), false).await;

        // acepta conexiones y nunca responde
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let sink = WebhookNotificationSink::new(url, StdDuration::from_millis(500)).unwrap();
        let service = Arc::new(NotificationService::new(
            db.pool().clone(),
            AlertAggregator::default(),
            Arc::new(sink),
            config(),
        ));

        let check = tokio::spawn({
            let service = service.clone();
            async move { service.run_check(now()).await }
        });
        tokio::time::sleep(StdDuration::from_millis(100)).await;

        let status = tokio::time::timeout(StdDuration::from_secs(1), service.status(now()))
            .await
            .expect("status must not wait for a delivery in progress");
        assert_eq!(status.sent_today, 0);

        let result = tokio::time::timeout(StdDuration::from_secs(5), check)
            .await
            .expect("check must end once the webhook times out")
            .unwrap()
            .unwrap();
        assert_eq!((result.delivered, result.failed), (0, 1));
    }
}
