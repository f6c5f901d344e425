//! AutoTrack
//!
//! Registro de vehículos y manutenciones con cálculo de vencimientos,
//! alertas ordenadas y notificaciones diarias sin duplicados.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
