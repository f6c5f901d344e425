//! Router HTTP
//!
//! `create_router` monta todas las rutas con el estado y las capas comunes.

pub mod alert_routes;
pub mod maintenance_routes;
pub mod vehicle_routes;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins, state.config.is_production());

    let api = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/maintenances", maintenance_routes::create_maintenance_router())
        .merge(alert_routes::create_alert_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "autotrack",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
