//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{error, info};

use crate::config::environment::EnvironmentConfig;
use crate::services::alert_aggregator::AlertAggregator;
use crate::services::due_status::DueStatusEvaluator;
use crate::services::maintenance_types::default_types;
use crate::services::notification_service::{
    LogNotificationSink, NotificationService, NotificationSink, WebhookNotificationSink,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: EnvironmentConfig,
    pub aggregator: AlertAggregator,
    pub notifications: Arc<NotificationService>,
    pub maintenance_types: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: EnvironmentConfig) -> Self {
        let aggregator = AlertAggregator::new(DueStatusEvaluator::new(config.thresholds));

        let sink = notification_sink(&config);

        let notifications = Arc::new(NotificationService::new(
            pool.clone(),
            aggregator.clone(),
            sink,
            config.notifications.clone(),
        ));

        Self {
            pool,
            config,
            aggregator,
            notifications,
            maintenance_types: Arc::new(default_types()),
        }
    }

    /// Sustituye la lista de tipos sugeridos
    pub fn with_maintenance_types(mut self, types: Vec<String>) -> Self {
        self.maintenance_types = Arc::new(types);
        self
    }
}

/// Webhook si hay URL configurada; si falta o el cliente no se puede crear, log
fn notification_sink(config: &EnvironmentConfig) -> Arc<dyn NotificationSink> {
    let Some(url) = &config.notifications.webhook_url else {
        return Arc::new(LogNotificationSink);
    };

    match WebhookNotificationSink::new(url.clone(), config.notifications.webhook_timeout) {
        Ok(sink) => {
            info!("🔗 Notificaciones enviadas por webhook a {}", url);
            Arc::new(sink)
        }
        Err(e) => {
            error!("❌ Webhook de notificaciones desactivado: {}", e);
            Arc::new(LogNotificationSink)
        }
    }
}
