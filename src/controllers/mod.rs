//! Controllers
//!
//! Orquestan repositorios y servicios para cada grupo de rutas.

pub mod alert_controller;
pub mod maintenance_controller;
pub mod vehicle_controller;
