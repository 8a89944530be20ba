// ============================================================================
// Multirealm API - Realm User Handlers
// File: crates/multirealm-api/src/handlers/users.rs
// ============================================================================

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;

use multirealm_core::domain::{CreateUserRequest, RealmUser, UpdateUserRequest};
use multirealm_security::Principal;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(realm) = path?;
    let Json(request) = payload?;
    info!("{} creates user {} in realm {}", principal.name(), request.username, realm);

    let user = state.users.create(&realm, request).await?;
    let location = format!("/api/realms/{}/users/{}", realm, user.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<RealmUser>>, ApiError> {
    let Path(realm) = path?;
    Ok(Json(state.users.list(&realm).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<RealmUser>, ApiError> {
    let Path((realm, user_id)) = path?;
    Ok(Json(state.users.get(&realm, &user_id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<RealmUser>, ApiError> {
    let Path((realm, user_id)) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.users.update(&realm, &user_id, patch).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((realm, user_id)) = path?;
    info!("{} deletes user {} in realm {}", principal.name(), user_id, realm);
    state.users.delete(&realm, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn enable_user(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((realm, user_id)) = path?;
    state.users.set_enabled(&realm, &user_id, true).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn disable_user(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((realm, user_id)) = path?;
    state.users.set_enabled(&realm, &user_id, false).await?;
    Ok(StatusCode::NO_CONTENT)
}
