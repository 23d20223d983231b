//! Contest handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    middleware::auth::OptionalAuth,
    services::ContestService,
    state::AppState,
};

use super::{
    request::ListContestsQuery,
    response::{CategoryResponse, ContestListResponse, ContestResponse},
};

/// List published contests
pub async fn list_contests(
    State(state): State<AppState>,
    Query(query): Query<ListContestsQuery>,
) -> AppResult<Json<ContestListResponse>> {
    let response = ContestService::list_published(state.db(), query.page, query.per_page).await?;
    Ok(Json(response))
}

/// Contest detail with derived flags
pub async fn get_contest(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> AppResult<Json<ContestResponse>> {
    let response = ContestService::get_contest(state.db(), &slug, user.as_ref()).await?;
    Ok(Json(response))
}

/// Categories with the caller's occupancy
pub async fn list_categories(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<CategoryResponse>>> {
    let categories = ContestService::list_categories(state.db(), &slug, user.as_ref()).await?;
    Ok(Json(categories))
}
