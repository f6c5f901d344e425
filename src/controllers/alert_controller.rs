use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::models::{Alert, AlertSummary};
use crate::repositories::FleetSnapshot;
use crate::services::alert_aggregator::AlertAggregator;
use crate::utils::errors::AppError;

pub struct AlertController {
    pool: SqlitePool,
}

impl AlertController {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Alertas ordenadas de toda la flota en el instante `now`
    pub async fn alerts(
        &self,
        aggregator: &AlertAggregator,
        now: NaiveDateTime,
    ) -> Result<Vec<Alert>, AppError> {
        let snapshot = FleetSnapshot::load(&self.pool).await?;
        Ok(aggregator.aggregate(&snapshot.vehicles, &snapshot.records, now))
    }

    pub async fn summary(
        &self,
        aggregator: &AlertAggregator,
        now: NaiveDateTime,
    ) -> Result<AlertSummary, AppError> {
        let snapshot = FleetSnapshot::load(&self.pool).await?;
        Ok(aggregator.summarize(&snapshot.vehicles, &snapshot.records, now))
    }
}
