use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::core::store::types::TaskAssignment;
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};
use crate::interfaces::web::extract::ApiPath;

pub async fn list_assigned_tasks(
    ApiPath(employee_id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TaskAssignment>>> {
    if state.db.get_employee(employee_id).await?.is_none() {
        return Err(ApiError::not_found("Employee"));
    }
    Ok(Json(
        state.db.list_assignments_for_employee(employee_id).await?,
    ))
}

pub async fn delete_assigned_task(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    if state.db.delete_assignment(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Assigned task"))
    }
}
