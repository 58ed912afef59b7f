use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use super::error::ApiError;
use crate::core::access::{AccessMode, AccessPolicy};
use crate::core::store::types::UserRecord;

/// The signed-in caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserRecord,
    pub token: String,
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    let value = req.headers().get("authorization")?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return ApiError::Unauthorized(
            "Missing or invalid Authorization header. Use: Bearer <token>".to_string(),
        )
        .into_response();
    };

    match state.db.user_for_token(&token).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(AuthUser { user, token });
            next.run(req).await
        }
        Ok(None) => ApiError::Unauthorized("Invalid or expired token".to_string()).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn enforce(policy: AccessPolicy, req: Request<Body>, next: Next) -> Response {
    let mode = AccessMode::from_method(req.method().as_str());
    let allowed = match req.extensions().get::<AuthUser>() {
        Some(auth) => policy.allows(&auth.user, mode),
        None => {
            return ApiError::Unauthorized("Authentication required".to_string()).into_response();
        }
    };
    if allowed {
        next.run(req).await
    } else {
        ApiError::Forbidden("You do not have permission to perform this action.".to_string())
            .into_response()
    }
}

pub async fn staff_only(req: Request<Body>, next: Next) -> Response {
    enforce(AccessPolicy::StaffOnly, req, next).await
}

pub async fn member_write_staff_read(req: Request<Body>, next: Next) -> Response {
    enforce(AccessPolicy::MemberWriteStaffRead, req, next).await
}

pub async fn authenticated(req: Request<Body>, next: Next) -> Response {
    enforce(AccessPolicy::Authenticated, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::web::test_support::test_state;
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use tower::util::ServiceExt;

    fn protected_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/api/ping",
                get(|axum::Extension(auth): axum::Extension<AuthUser>| async move {
                    auth.user.username
                })
                .post(|| async { "posted" }),
            )
            .route_layer(middleware::from_fn(member_write_staff_read))
            .layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    async fn call(app: Router, method: &str, token: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().method(method).uri("/api/ping");
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (state, _dir) = test_state().await;
        assert_eq!(
            call(protected_app(state), "GET", None).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let (state, _dir) = test_state().await;
        assert_eq!(
            call(protected_app(state), "GET", Some("itk_bogus")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn policy_applies_after_authentication() {
        let (state, _dir) = test_state().await;
        let staff = state.db.create_user("boss", "pw", "", true).await.unwrap();
        let member = state.db.create_user("asha", "pw", "", false).await.unwrap();
        let staff_token = state.db.create_auth_token(staff.id).await.unwrap();
        let member_token = state.db.create_auth_token(member.id).await.unwrap();

        let app = protected_app(state);
        assert_eq!(
            call(app.clone(), "GET", Some(&staff_token)).await,
            StatusCode::OK
        );
        assert_eq!(
            call(app.clone(), "POST", Some(&staff_token)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(app, "POST", Some(&member_token)).await,
            StatusCode::OK
        );
    }

    #[test]
    fn bearer_and_token_schemes_are_accepted() {
        let req = Request::builder()
            .header("authorization", "Token itk_abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req).as_deref(), Some("itk_abc"));

        let req = Request::builder()
            .header("authorization", "Basic Zm9vOmJhcg==")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req), None);
    }
}
