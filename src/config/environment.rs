//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Todas las variables tienen
//! un valor por defecto; un valor que no se puede interpretar se ignora con un
//! aviso en el log.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::config::database::DatabaseConfig;
use crate::services::due_status::{DueThresholds, DEFAULT_IMMINENT_KM, KM_PER_DAY};

/// Lee una variable de entorno y la interpreta; si falta o es inválida usa `default`
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("⚠️ Valor inválido para {}: '{}', usando el valor por defecto", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Configuración del notificador en segundo plano
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub check_interval: Duration,
    pub webhook_url: Option<String>,
    pub webhook_timeout: Duration,
    pub sent_log_path: Option<PathBuf>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: Duration::from_secs(30 * 60),
            webhook_url: None,
            webhook_timeout: Duration::from_secs(10),
            sent_log_path: Some(PathBuf::from("db/notifications-sent.json")),
        }
    }
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let minutes: u64 = env_or("NOTIFY_CHECK_INTERVAL_MINUTES", 30).max(1);

        Self {
            enabled: env_or("NOTIFY_ENABLED", defaults.enabled),
            check_interval: Duration::from_secs(minutes * 60),
            webhook_url: env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            webhook_timeout: Duration::from_secs(
                env_or("NOTIFY_WEBHOOK_TIMEOUT_SECONDS", defaults.webhook_timeout.as_secs()).max(1),
            ),
            sent_log_path: match env::var("NOTIFY_SENT_LOG_PATH") {
                Ok(path) if path.trim().is_empty() => None,
                Ok(path) => Some(PathBuf::from(path)),
                Err(_) => defaults.sent_log_path,
            },
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub notifications: NotificationConfig,
    pub thresholds: DueThresholds,
    pub maintenance_types_file: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            database: DatabaseConfig::default(),
            notifications: NotificationConfig::default(),
            thresholds: DueThresholds::default(),
            maintenance_types_file: None,
        }
    }
}

impl EnvironmentConfig {
    /// Carga la configuración desde el entorno
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: env_or("PORT", defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            database: DatabaseConfig::from_env(),
            notifications: NotificationConfig::from_env(),
            thresholds: DueThresholds {
                imminent_km: env_or("IMMINENT_KM_THRESHOLD", DEFAULT_IMMINENT_KM).max(0),
                km_per_day: KM_PER_DAY,
            },
            maintenance_types_file: env::var("MAINTENANCE_TYPES_FILE").ok().map(PathBuf::from),
        }
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert_eq!(config.thresholds.imminent_km, 3000);
        assert_eq!(config.thresholds.km_per_day, 50);
        assert_eq!(config.notifications.check_interval, Duration::from_secs(1800));
        assert_eq!(config.notifications.webhook_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("AUTOTRACK_TEST_ENV_OR", "not-a-number");
        assert_eq!(env_or("AUTOTRACK_TEST_ENV_OR", 42u32), 42);

        env::set_var("AUTOTRACK_TEST_ENV_OR", " 7 ");
        assert_eq!(env_or("AUTOTRACK_TEST_ENV_OR", 42u32), 7);
        env::remove_var("AUTOTRACK_TEST_ENV_OR");

        assert!(env_or("AUTOTRACK_TEST_ENV_OR_MISSING", true));
    }
}
