use axum::{
    Json,
    extract::State,
};

use crate::core::suggest::NextTasksReport;
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};
use crate::interfaces::web::extract::ApiPath;

pub async fn next_tasks(
    ApiPath(employee_id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<NextTasksReport>> {
    let Some(pipeline) = state.pipeline.as_ref() else {
        return Err(ApiError::Unavailable(
            "Suggestion service is not configured".to_string(),
        ));
    };
    let report = pipeline.generate_next_tasks(employee_id).await?;
    Ok(Json(report))
}
