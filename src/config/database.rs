//! Configuración de base de datos
//!
//! Este módulo maneja la configuración del pool SQLite con SQLx.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::environment::env_or;

/// URL por defecto: fichero dentro de la carpeta `db`
pub const DEFAULT_DATABASE_URL: &str = "sqlite://db/autotrack.db";

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl DatabaseConfig {
    /// Lee `DATABASE_URL` y `DATABASE_MAX_CONNECTIONS`; el resto por defecto
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            ..defaults
        }
    }

    /// Opciones de conexión: crea el fichero si falta y activa las claves foráneas
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        Ok(SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .foreign_keys(true))
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<SqlitePool, sqlx::Error> {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .connect_with(self.connect_options()?)
            .await
    }

    /// Pool en memoria para tests: una única conexión que nunca se recicla
    pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, DEFAULT_DATABASE_URL);
        assert!(config.max_connections >= config.min_connections);
    }

    #[test]
    fn test_connect_options_parse() {
        let config = DatabaseConfig {
            url: "sqlite://db/test.db".to_string(),
            ..DatabaseConfig::default()
        };
        let options = config.connect_options().unwrap();
        assert!(options.get_filename().ends_with("test.db"));
    }
}
