//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the goal REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    dto::{
        serialize_goal, CreateGoalRequest, GoalListResponse, GoalResponse, ListGoalsParams,
        MessageResponse, NumberOrString, ProgressPatchRequest, StatusPatchRequest,
        UpdateGoalRequest,
    },
    extract::GoalJson,
    http_error::{ErrorBody, HttpError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        get_current_goal_handler,
        list_goals_handler,
        get_goal_handler,
        create_goal_handler,
        update_goal_handler,
        delete_goal_handler,
        patch_goal_status_handler,
        patch_goal_progress_handler,
    ),
    components(
        schemas(
            GoalResponse,
            GoalListResponse,
            CreateGoalRequest,
            UpdateGoalRequest,
            StatusPatchRequest,
            ProgressPatchRequest,
            NumberOrString,
            MessageResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Goals API", description = "Goal tracking endpoints for the portfolio site.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Get the current goal: the most recently updated goal that is planning,
/// active or paused. Responds with `null` when there is none.
#[utoipa::path(
    get,
    path = "/api/goals/current",
    responses(
        (status = 200, description = "The current goal, or null when there is none", body = GoalResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_current_goal_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<GoalResponse>>, HttpError> {
    let goal = state
        .goals
        .find_current()
        .await
        .map_err(|e| state.fail("Failed to fetch current goal", e))?;
    Ok(Json(serialize_goal(goal)))
}

/// List goals, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/goals",
    params(ListGoalsParams),
    responses(
        (status = 200, description = "A page of goals", body = GoalListResponse),
        (status = 400, description = "Unknown status in filter", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_goals_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListGoalsParams>,
) -> Result<Json<GoalListResponse>, HttpError> {
    let query = params
        .into_query()
        .map_err(|e| state.fail("Invalid goal query", e))?;
    let page = state
        .goals
        .list_goals(&query)
        .await
        .map_err(|e| state.fail("Failed to fetch goals", e))?;
    Ok(Json(page.into()))
}

/// Get a single goal.
#[utoipa::path(
    get,
    path = "/api/goals/{id}",
    params(("id" = Uuid, Path, description = "Goal id")),
    responses(
        (status = 200, description = "The goal", body = GoalResponse),
        (status = 404, description = "Goal not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_goal_handler(
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalResponse>, HttpError> {
    let goal = state
        .goals
        .get_goal_by_id(goal_id)
        .await
        .map_err(|e| state.fail("Failed to fetch goal", e))?;
    Ok(Json(goal.into()))
}

/// Create a goal. `title`, `description`, `startDate` and `endDate` are required.
#[utoipa::path(
    post,
    path = "/api/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Missing required fields or malformed body", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_goal_handler(
    State(state): State<Arc<AppState>>,
    GoalJson(request): GoalJson<CreateGoalRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let new_goal = request
        .into_new_goal()
        .map_err(|e| state.fail("Invalid goal payload", e))?;
    let goal = state
        .goals
        .create_goal(new_goal)
        .await
        .map_err(|e| state.fail("Failed to create goal", e))?;
    info!("Created goal {} ({})", goal.id, goal.title);
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))))
}

/// Replace some or all fields of a goal.
#[utoipa::path(
    put,
    path = "/api/goals/{id}",
    params(("id" = Uuid, Path, description = "Goal id")),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = GoalResponse),
        (status = 400, description = "Invalid field value or malformed body", body = ErrorBody),
        (status = 404, description = "Goal not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_goal_handler(
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
    GoalJson(request): GoalJson<UpdateGoalRequest>,
) -> Result<Json<GoalResponse>, HttpError> {
    let changes = request
        .into_changes()
        .map_err(|e| state.fail("Invalid goal payload", e))?;
    let goal = state
        .goals
        .update_goal(goal_id, changes)
        .await
        .map_err(|e| state.fail("Failed to update goal", e))?;
    info!("Updated goal {}", goal.id);
    Ok(Json(goal.into()))
}

/// Delete a goal.
#[utoipa::path(
    delete,
    path = "/api/goals/{id}",
    params(("id" = Uuid, Path, description = "Goal id")),
    responses(
        (status = 200, description = "Goal deleted", body = MessageResponse),
        (status = 404, description = "Goal not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn delete_goal_handler(
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HttpError> {
    state
        .goals
        .delete_goal(goal_id)
        .await
        .map_err(|e| state.fail("Failed to delete goal", e))?;
    info!("Deleted goal {}", goal_id);
    Ok(Json(MessageResponse {
        message: "Goal deleted successfully".to_string(),
    }))
}

/// Move a goal to a new status. `actualStartDate`, `pausedAt` and
/// `totalPausedDuration` are written only when present; `null` clears them.
#[utoipa::path(
    patch,
    path = "/api/goals/{id}/status",
    params(("id" = Uuid, Path, description = "Goal id")),
    request_body = StatusPatchRequest,
    responses(
        (status = 200, description = "Status updated", body = GoalResponse),
        (status = 400, description = "Missing or unknown status", body = ErrorBody),
        (status = 404, description = "Goal not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn patch_goal_status_handler(
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
    GoalJson(request): GoalJson<StatusPatchRequest>,
) -> Result<Json<GoalResponse>, HttpError> {
    let changes = request
        .into_changes()
        .map_err(|e| state.fail("Invalid status update", e))?;
    let goal = state
        .goals
        .update_goal(goal_id, changes)
        .await
        .map_err(|e| state.fail("Failed to update goal status", e))?;
    info!("Goal {} is now {}", goal.id, goal.status);
    Ok(Json(goal.into()))
}

/// Set a goal's progress percentage. Values are not clamped to 0..=100.
#[utoipa::path(
    patch,
    path = "/api/goals/{id}/progress",
    params(("id" = Uuid, Path, description = "Goal id")),
    request_body = ProgressPatchRequest,
    responses(
        (status = 200, description = "Progress updated", body = GoalResponse),
        (status = 400, description = "Missing or non-numeric progress", body = ErrorBody),
        (status = 404, description = "Goal not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn patch_goal_progress_handler(
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<Uuid>,
    GoalJson(request): GoalJson<ProgressPatchRequest>,
) -> Result<Json<GoalResponse>, HttpError> {
    let changes = request
        .into_changes()
        .map_err(|e| state.fail("Invalid progress update", e))?;
    let goal = state
        .goals
        .update_goal(goal_id, changes)
        .await
        .map_err(|e| state.fail("Failed to update goal progress", e))?;
    Ok(Json(goal.into()))
}
