use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::store::types::{Screenshot, TaskDetails, TaskInput, TaskPatch};
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};
use crate::interfaces::web::extract::{ApiJson, ApiPath};

#[derive(Deserialize)]
pub struct ScreenshotPayload {
    pub image: String,
}

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskDetails>>> {
    Ok(Json(state.db.list_tasks().await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TaskInput>,
) -> ApiResult<(StatusCode, Json<TaskDetails>)> {
    let task = state.db.create_task(&payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<TaskDetails>> {
    state
        .db
        .get_task(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task"))
}

pub async fn update_task(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> ApiResult<Json<TaskDetails>> {
    state
        .db
        .update_task(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task"))
}

pub async fn delete_task(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    if state.db.delete_task(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Task"))
    }
}

pub async fn add_screenshot(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ScreenshotPayload>,
) -> ApiResult<(StatusCode, Json<Screenshot>)> {
    if payload.image.trim().is_empty() {
        return Err(ApiError::BadRequest("image is required".to_string()));
    }
    state
        .db
        .add_screenshot(id, payload.image.trim())
        .await?
        .map(|shot| (StatusCode::CREATED, Json(shot)))
        .ok_or_else(|| ApiError::not_found("Task"))
}

pub async fn list_employee_tasks(
    ApiPath(employee_id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    if state.db.get_employee(employee_id).await?.is_none() {
        return Err(ApiError::not_found("Employee"));
    }
    Ok(Json(state.db.list_tasks_for_employee(employee_id).await?))
}

#[cfg(test)]
mod tests {
    use crate::core::store::seed_employee;
    use crate::interfaces::web::router::build_api_router;
    use crate::interfaces::web::test_support::{
        json_request, member_token, staff_token, test_state,
    };
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn member_creates_task_with_screenshot() {
        let (state, _dir) = test_state().await;
        let token = member_token(&state).await;
        let emp = seed_employee(&state.db, "Asha Nair").await;
        let app = build_api_router(state);

        let (status, task) = json_request(
            app.clone(),
            Method::POST,
            "/api/tasks",
            Some(json!({
                "employee": emp.id,
                "title": "Build login page",
                "description": "Form plus validation",
                "priority": "high",
                "estimated_hours": 4.5
            })),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["status"], "pending");
        assert_eq!(task["employee_name"], "Asha Nair");

        let (status, shot) = json_request(
            app.clone(),
            Method::POST,
            &format!("/api/tasks/{}/screenshots", task["id"]),
            Some(json!({ "image": "screenshots/login.png" })),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(shot["image"], "screenshots/login.png");

        let (status, listed) = json_request(
            app,
            Method::GET,
            &format!("/api/employees/{}/tasks", emp.id),
            None,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["screenshots"][0]["image"], "screenshots/login.png");
    }

    #[tokio::test]
    async fn staff_may_read_but_not_write_tasks() {
        let (state, _dir) = test_state().await;
        let token = staff_token(&state).await;
        let emp = seed_employee(&state.db, "Asha Nair").await;
        let app = build_api_router(state);

        let (status, _) =
            json_request(app.clone(), Method::GET, "/api/tasks", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = json_request(
            app,
            Method::POST,
            "/api/tasks",
            Some(json!({ "employee": emp.id, "title": "Nope" })),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn patch_updates_status_only() {
        let (state, _dir) = test_state().await;
        let token = member_token(&state).await;
        let emp = seed_employee(&state.db, "Asha Nair").await;
        let task = state
            .db
            .create_task(&crate::core::store::types::TaskInput::new(
                emp.id, "Write docs", "API docs", "low",
            ))
            .await
            .unwrap();
        let app = build_api_router(state);

        let (status, body) = json_request(
            app.clone(),
            Method::PATCH,
            &format!("/api/tasks/{}", task.id),
            Some(json!({ "status": "done" })),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "done");
        assert_eq!(body["title"], "Write docs");

        let (status, _) = json_request(
            app,
            Method::DELETE,
            &format!("/api/tasks/{}", task.id),
            None,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn screenshot_for_missing_task_is_not_found() {
        let (state, _dir) = test_state().await;
        let token = member_token(&state).await;
        let app = build_api_router(state);

        let (status, _) = json_request(
            app,
            Method::POST,
            "/api/tasks/77/screenshots",
            Some(json!({ "image": "x.png" })),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
