//! Middleware del sistema
//!
//! CORS configurable desde el entorno.

pub mod cors;

pub use cors::*;
