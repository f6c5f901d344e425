//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el cálculo
//! del estado de vencimiento, la agregación de alertas y el notificador.

pub mod alert_aggregator;
pub mod due_status;
pub mod maintenance_types;
pub mod notification_dedup;
pub mod notification_service;

pub use alert_aggregator::AlertAggregator;
pub use due_status::{DueStatusEvaluator, DueThresholds};
pub use notification_service::{
    LogNotificationSink, Notification, NotificationService, NotificationSink,
    WebhookNotificationSink,
};
