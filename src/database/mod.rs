//! Módulo de base de datos
//!
//! Maneja la conexión y el esquema SQLite

pub mod connection;

pub use connection::DatabaseConnection;
