//! De-duplicador de notificaciones
//!
//! Garantiza que cada pareja (manutención, día) dispare como máximo una
//! notificación. El conjunto de claves vale sólo para el día en curso: al
//! cambiar de día se descarta entero.
//!
//! La persistencia en disco es opcional y de mejor esfuerzo; si falla, el
//! llamador la trata como "nada registrado".

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Instantánea del registro de notificaciones enviadas en un día
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentLog {
    pub date: NaiveDate,
    pub notifications: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationDeduplicator {
    day: Option<NaiveDate>,
    sent: HashSet<String>,
}

impl NotificationDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruye el estado desde una instantánea; si es de otro día se ignora
    pub fn from_log(log: SentLog, today: NaiveDate) -> Self {
        if log.date != today {
            return Self::new();
        }
        Self {
            day: Some(today),
            sent: log.notifications.into_iter().collect(),
        }
    }

    /// Clave compuesta `"{id}-{YYYY-MM-DD}"`
    pub fn key(record_id: Uuid, day: NaiveDate) -> String {
        format!("{}-{}", record_id, day.format("%Y-%m-%d"))
    }

    pub fn should_notify(&self, record_id: Uuid, now: NaiveDateTime) -> bool {
        let today = now.date();
        if self.day != Some(today) {
            return true;
        }
        !self.sent.contains(&Self::key(record_id, today))
    }

    pub fn mark_sent(&mut self, record_id: Uuid, now: NaiveDateTime) {
        let today = now.date();
        self.roll_over(today);
        self.sent.insert(Self::key(record_id, today));
    }

    /// Número de notificaciones registradas para el día de `now`
    pub fn sent_today(&self, now: NaiveDateTime) -> usize {
        if self.day == Some(now.date()) {
            self.sent.len()
        } else {
            0
        }
    }

    pub fn snapshot(&self) -> Option<SentLog> {
        let date = self.day?;
        let mut notifications: Vec<String> = self.sent.iter().cloned().collect();
        notifications.sort();
        Some(SentLog {
            date,
            notifications,
        })
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if self.day != Some(today) {
            self.sent.clear();
            self.day = Some(today);
        }
    }
}

/// Fichero JSON donde se guarda el `SentLog` entre reinicios
#[derive(Debug, Clone)]
pub struct SentLogFile {
    path: PathBuf,
}

impl SentLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` si el fichero aún no existe
    pub async fn load(&self) -> Result<Option<SentLog>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };

        let log = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(log))
    }

    pub async fn save(&self, log: &SentLog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let raw = serde_json::to_vec(log)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
