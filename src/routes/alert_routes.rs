use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;

use crate::controllers::alert_controller::AlertController;
use crate::dto::alert_dto::{CheckResponse, EvaluationQuery, NotificationStatusResponse};
use crate::models::{Alert, AlertSummary};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_alert_router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/stats", get(get_stats))
        .route("/maintenance-types", get(list_maintenance_types))
        .route("/notifications/status", get(notification_status))
        .route("/notifications/check", post(run_notification_check))
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<Vec<Alert>>, AppError> {
    let controller = AlertController::new(state.pool.clone());
    Ok(Json(controller.alerts(&state.aggregator, query.now()).await?))
}

async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<AlertSummary>, AppError> {
    let controller = AlertController::new(state.pool.clone());
    Ok(Json(controller.summary(&state.aggregator, query.now()).await?))
}

async fn list_maintenance_types(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.maintenance_types.as_ref().clone())
}

async fn notification_status(State(state): State<AppState>) -> Json<NotificationStatusResponse> {
    Json(state.notifications.status(Local::now().naive_local()).await)
}

async fn run_notification_check(
    State(state): State<AppState>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    Ok(Json(state.notifications.run_check(query.now()).await?))
}
