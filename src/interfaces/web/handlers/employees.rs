use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::store::types::{Employee, EmployeeInput, EmployeePatch};
use crate::core::store::{Page, PageRequest};
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};
use crate::interfaces::web::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Deserialize, Default)]
pub struct EmployeeFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn list_employees(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<EmployeeFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<Employee>>> {
    let page = state
        .db
        .list_employees(filter.name.as_deref(), filter.email.as_deref(), &page)
        .await?;
    Ok(Json(page))
}

pub async fn create_employee(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EmployeeInput>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let employee = state.db.create_employee(&payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<Employee>> {
    state
        .db
        .get_employee(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Employee"))
}

pub async fn update_employee(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<EmployeePatch>,
) -> ApiResult<Json<Employee>> {
    state
        .db
        .update_employee(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Employee"))
}

pub async fn delete_employee(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    if state.db.delete_employee(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Employee"))
    }
}
