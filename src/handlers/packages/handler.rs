//! Package handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::AuthenticatedUser,
    services::PackageService,
    state::AppState,
};

use super::{
    request::CreatePackageRequest,
    response::{LabelsResponse, PackageResponse},
};

pub async fn create_package(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePackageRequest>,
) -> AppResult<(StatusCode, Json<PackageResponse>)> {
    payload.validate()?;
    let package = PackageService::create_package(state.db(), &user, &payload.entry_ids).await?;
    let (package, entry_ids) = PackageService::get_package(state.db(), &user, &package.id).await?;
    Ok((StatusCode::CREATED, Json(PackageResponse { package, entry_ids })))
}

pub async fn get_package(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PackageResponse>> {
    let (package, entry_ids) = PackageService::get_package(state.db(), &user, &id).await?;
    Ok(Json(PackageResponse { package, entry_ids }))
}

pub async fn get_labels(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LabelsResponse>> {
    let labels = PackageService::labels(state.db(), &user, &id).await?;
    Ok(Json(LabelsResponse {
        package_id: id,
        labels,
    }))
}
