use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::store::types::{City, Country, StateRecord};
use crate::core::store::{Page, PageRequest};
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};
use crate::interfaces::web::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Deserialize)]
pub struct CountryPayload {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct StatePayload {
    pub name: Option<String>,
    pub country: Option<i64>,
}

#[derive(Deserialize)]
pub struct CityPayload {
    pub name: Option<String>,
    pub state: Option<i64>,
}

fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

fn deleted(found: bool, what: &str) -> ApiResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(what))
    }
}

// --- Countries ---

pub async fn list_countries(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<Country>>> {
    Ok(Json(state.db.list_countries(&page).await?))
}

pub async fn create_country(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CountryPayload>,
) -> ApiResult<(StatusCode, Json<Country>)> {
    let name = required(payload.name, "name")?;
    let country = state.db.create_country(&name).await?;
    Ok((StatusCode::CREATED, Json(country)))
}

pub async fn get_country(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<Country>> {
    state
        .db
        .get_country(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Country"))
}

pub async fn update_country(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CountryPayload>,
) -> ApiResult<Json<Country>> {
    state
        .db
        .update_country(id, payload.name.as_deref())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Country"))
}

pub async fn delete_country(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_country(id).await?, "Country")
}

// --- States ---

pub async fn list_states(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<StateRecord>>> {
    Ok(Json(state.db.list_states(&page).await?))
}

pub async fn create_state(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StatePayload>,
) -> ApiResult<(StatusCode, Json<StateRecord>)> {
    let name = required(payload.name, "name")?;
    let country = required(payload.country, "country")?;
    let record = state.db.create_state(&name, country).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_state(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<StateRecord>> {
    state
        .db
        .get_state(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("State"))
}

pub async fn update_state(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StatePayload>,
) -> ApiResult<Json<StateRecord>> {
    state
        .db
        .update_state(id, payload.name.as_deref(), payload.country)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("State"))
}

pub async fn delete_state(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_state(id).await?, "State")
}

// --- Cities ---

pub async fn list_cities(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<Json<Page<City>>> {
    Ok(Json(state.db.list_cities(&page).await?))
}

pub async fn create_city(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CityPayload>,
) -> ApiResult<(StatusCode, Json<City>)> {
    let name = required(payload.name, "name")?;
    let parent = required(payload.state, "state")?;
    let city = state.db.create_city(&name, parent).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

pub async fn get_city(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<Json<City>> {
    state
        .db
        .get_city(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("City"))
}

pub async fn update_city(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CityPayload>,
) -> ApiResult<Json<City>> {
    state
        .db
        .update_city(id, payload.name.as_deref(), payload.state)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("City"))
}

pub async fn delete_city(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    deleted(state.db.delete_city(id).await?, "City")
}
