// ============================================================================
// Multirealm API - Organization Handlers
// File: crates/multirealm-api/src/handlers/organizations.rs
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

use multirealm_core::domain::{NewOrganization, Organization, OrganizationPatch};
use multirealm_security::Principal;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_organization(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<NewOrganization>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    info!("{} creates organization {}", principal.name(), request.name);

    let organization = state.organizations.create(request).await?;
    let location = format!("/api/organizations/{}", organization.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(organization)))
}

pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Organization>>, ApiError> {
    Ok(Json(state.organizations.list().await?))
}

pub async fn get_organization(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Organization>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.organizations.get(id).await?))
}

pub async fn update_organization(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrganizationPatch>, JsonRejection>,
) -> Result<Json<Organization>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(Json(state.organizations.update(id, patch).await?))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    info!("{} deletes organization {}", principal.name(), id);
    state.organizations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn enable_organization(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Organization>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.organizations.set_enabled(id, true).await?))
}

pub async fn disable_organization(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Organization>, ApiError> {
    let Path(id) = path?;
    Ok(Json(state.organizations.set_enabled(id, false).await?))
}
