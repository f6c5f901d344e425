use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::maintenance_controller::MaintenanceController;
use crate::dto::maintenance_dto::{
    CompletionRequest, CreateMaintenanceRequest, UpdateMaintenanceRequest,
};
use crate::dto::ApiResponse;
use crate::models::MaintenanceRecord;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenances).post(create_maintenance))
        .route(
            "/:id",
            get(get_maintenance)
                .put(update_maintenance)
                .delete(delete_maintenance),
        )
        .route("/:id/completion", put(set_completion))
}

async fn create_maintenance(
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceRecord>>), AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    let response = controller.create(None, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_maintenances(
    State(state): State<AppState>,
) -> Result<Json<Vec<MaintenanceRecord>>, AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    Ok(Json(controller.list().await?))
}

async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceRecord>, AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceRecord>>, AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn set_completion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<ApiResponse<MaintenanceRecord>>, AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    Ok(Json(controller.set_completion(id, request).await?))
}

async fn delete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let controller = MaintenanceController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
