//! Router assembly

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::error::ApiError;
use crate::handlers::{health, organizations, users, whoami};
use crate::middleware::authorize;
use crate::state::AppState;

async fn not_found() -> ApiError {
    ApiError::NotFound("No route".to_string())
}

pub fn create_router(state: AppState) -> Router {
    // Public routes (authorization middleware lets them through)
    let public_routes = Router::new()
        .route("/ping", get(health::ping))
        .route("/actuator/health", get(health::health_check));

    // Admin routes (/api/**)
    let organization_routes = Router::new()
        .route(
            "/api/organizations",
            post(organizations::create_organization).get(organizations::list_organizations),
        )
        .route(
            "/api/organizations/{id}",
            get(organizations::get_organization)
                .put(organizations::update_organization)
                .delete(organizations::delete_organization),
        )
        .route("/api/organizations/{id}/enable", post(organizations::enable_organization))
        .route("/api/organizations/{id}/disable", post(organizations::disable_organization));

    let user_routes = Router::new()
        .route(
            "/api/realms/{realm}/users",
            post(users::create_user).get(users::list_users),
        )
        .route(
            "/api/realms/{realm}/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/realms/{realm}/users/{user_id}/enable", post(users::enable_user))
        .route("/api/realms/{realm}/users/{user_id}/disable", post(users::disable_user));

    // Any valid token
    let authenticated_routes = Router::new().route("/whoami", get(whoami::whoami));

    Router::new()
        .merge(public_routes)
        .merge(organization_routes)
        .merge(user_routes)
        .merge(authenticated_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .with_state(state)
}
