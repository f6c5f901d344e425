use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::maintenance_controller::MaintenanceController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::alert_dto::EvaluationQuery;
use crate::dto::maintenance_dto::CreateMaintenanceRequest;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateOdometerRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::{MaintenanceRecord, RecordWithStatus, Vehicle};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/odometer", put(update_odometer))
        .route(
            "/:id/maintenances",
            get(list_vehicle_maintenances).post(create_vehicle_maintenance),
        )
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.list().await?))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn update_odometer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOdometerRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.update_odometer(id, request).await?))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let removed = controller.delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Vehicle deleted",
        "deleted_maintenances": removed
    })))
}

async fn list_vehicle_maintenances(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<Vec<RecordWithStatus>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let records = controller
        .list_maintenances(id, &state.aggregator, query.now())
        .await?;
    Ok(Json(records))
}

async fn create_vehicle_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceRecord>>), AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    let response = controller.create(Some(id), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
