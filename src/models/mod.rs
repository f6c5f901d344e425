//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean a las tablas SQLite
//! y los tipos derivados (estado de vencimiento, alertas) que nunca se persisten.

pub mod alert;
pub mod maintenance;
pub mod vehicle;

pub use alert::{Alert, AlertSummary, DueState, DueStatus, RecordWithStatus};
pub use maintenance::MaintenanceRecord;
pub use vehicle::Vehicle;
