//! Entry handler implementations

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
    models::Entry,
    services::EntryService,
    state::AppState,
};

use super::{
    request::EntryRequest,
    response::{DeleteEntryResponse, EntryListResponse},
};

/// Register an entry in a contest
pub async fn create_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<EntryRequest>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    payload.validate()?;
    let entry = EntryService::create_entry(state.db(), &user, &slug, &payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// The caller's entries in a contest
pub async fn list_my_entries(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<Json<EntryListResponse>> {
    let response = EntryService::list_mine(state.db(), &user, &slug).await?;
    Ok(Json(response))
}

pub async fn get_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Entry>> {
    let entry = EntryService::get_entry(state.db(), &user, &id).await?;
    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryRequest>,
) -> AppResult<Json<Entry>> {
    payload.validate()?;
    let entry = EntryService::update_entry(state.db(), &user, &id, &payload).await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteEntryResponse>> {
    EntryService::delete_entry(state.db(), &user, &id).await?;
    Ok(Json(DeleteEntryResponse {
        message: "Entry deleted".to_string(),
    }))
}
