use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::auth;
use super::handlers::{assignments, employees, geo, session, suggestions, tasks};

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", api_port),
        format!("http://localhost:{}", api_port),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_api_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/login", post(session::login))
        .route("/api/health", get(session::health));

    let staff_routes = Router::new()
        .route(
            "/api/countries",
            get(geo::list_countries).post(geo::create_country),
        )
        .route(
            "/api/countries/{id}",
            get(geo::get_country)
                .put(geo::update_country)
                .patch(geo::update_country)
                .delete(geo::delete_country),
        )
        .route("/api/states", get(geo::list_states).post(geo::create_state))
        .route(
            "/api/states/{id}",
            get(geo::get_state)
                .put(geo::update_state)
                .patch(geo::update_state)
                .delete(geo::delete_state),
        )
        .route("/api/cities", get(geo::list_cities).post(geo::create_city))
        .route(
            "/api/cities/{id}",
            get(geo::get_city)
                .put(geo::update_city)
                .patch(geo::update_city)
                .delete(geo::delete_city),
        )
        .route(
            "/api/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/api/employees/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route(
            "/api/employees/{id}/next-tasks",
            get(suggestions::next_tasks),
        )
        .route_layer(middleware::from_fn(auth::staff_only));

    let member_routes = Router::new()
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/api/tasks/{id}/screenshots",
            post(tasks::add_screenshot),
        )
        .route(
            "/api/employees/{id}/tasks",
            get(tasks::list_employee_tasks),
        )
        .route(
            "/api/employees/{id}/assigned-tasks",
            get(assignments::list_assigned_tasks),
        )
        .route_layer(middleware::from_fn(auth::member_write_staff_read));

    let any_user_routes = Router::new()
        .route("/api/logout", post(session::logout))
        .route(
            "/api/assigned-tasks/{id}",
            delete(assignments::delete_assigned_task),
        )
        .route_layer(middleware::from_fn(auth::authenticated));

    let authed_routes = Router::new()
        .merge(staff_routes)
        .merge(member_routes)
        .merge(any_user_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    public_routes
        .merge(authed_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(build_localhost_cors(state.api_port))
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    response
}
