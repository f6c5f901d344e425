//! Conexión a SQLite
//!
//! Crea el pool, la carpeta del fichero si hace falta y el esquema de las
//! dos tablas (`vehicles`, `maintenances`) con borrado en cascada.

use sqlx::SqlitePool;
use tracing::info;

use crate::config::database::DatabaseConfig;

const CREATE_VEHICLES: &str = r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id BLOB PRIMARY KEY NOT NULL,
        brand TEXT NOT NULL,
        model TEXT NOT NULL,
        plate TEXT NOT NULL UNIQUE,
        year INTEGER,
        current_km INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
"#;

const CREATE_MAINTENANCES: &str = r#"
    CREATE TABLE IF NOT EXISTS maintenances (
        id BLOB PRIMARY KEY NOT NULL,
        vehicle_id BLOB NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
        maintenance_type TEXT NOT NULL,
        due_date TEXT,
        due_km INTEGER,
        notify_days_before INTEGER NOT NULL DEFAULT 7,
        notes TEXT,
        completed BOOLEAN NOT NULL DEFAULT 0,
        completed_at TEXT,
        created_at TEXT NOT NULL
    )
"#;

const CREATE_MAINTENANCES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_maintenances_vehicle_id ON maintenances(vehicle_id)";

/// Conexión a la base de datos con el esquema ya creado
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Abre (o crea) la base de datos indicada y aplica el esquema
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = config.connect_options()?;
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        info!("🗄️ Conectando a {}", config.url);
        let pool = config.create_pool().await?;
        let connection = Self { pool };
        connection.run_migrations().await?;
        Ok(connection)
    }

    /// Base de datos en memoria con el esquema aplicado
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = DatabaseConfig::create_memory_pool().await?;
        let connection = Self { pool };
        connection.run_migrations().await?;
        Ok(connection)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Crea las tablas si no existen
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in [CREATE_VEHICLES, CREATE_MAINTENANCES, CREATE_MAINTENANCES_INDEX] {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("✅ Esquema de base de datos listo");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_and_foreign_keys() {
        let db = DatabaseConnection::in_memory().await.unwrap();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('vehicles', 'maintenances')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(count, 2);

        let (fk,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(fk, 1);

        // idempotente
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_creates_missing_folder() {
        let dir = std::env::temp_dir().join(format!("autotrack-db-{}", uuid::Uuid::new_v4()));
        let config = DatabaseConfig {
            url: format!("sqlite://{}/nested/autotrack.db", dir.display()),
            ..DatabaseConfig::default()
        };

        let db = DatabaseConnection::new(&config).await.unwrap();
        assert!(dir.join("nested").join("autotrack.db").exists());

        db.pool().close().await;
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
