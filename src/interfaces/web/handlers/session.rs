use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use crate::interfaces::web::AppState;
use crate::interfaces::web::auth::AuthUser;
use crate::interfaces::web::error::{ApiError, ApiResult};
use crate::interfaces::web::extract::ApiJson;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = state
        .db
        .authenticate(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid username or password".to_string()))?;

    let token = state.db.create_auth_token(user.id).await?;
    info!("User {} signed in", user.username);
    Ok(Json(serde_json::json!({ "token": token, "user": user })))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state.db.revoke_auth_token(&auth.token).await?;
    info!("User {} signed out", auth.user.username);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "suggestions_enabled": state.pipeline.is_some(),
    }))
}
