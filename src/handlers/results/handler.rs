//! Scoring and results handler implementations

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::{AuthenticatedUser, OptionalAuth},
    models::ScoreSheet,
    services::ResultsService,
    state::AppState,
};

use super::{request::ScoreSheetRequest, response::ResultsResponse};

/// Published ranking; staff can preview it
pub async fn get_results(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> AppResult<Json<ResultsResponse>> {
    let results = ResultsService::results(state.db(), &slug, user.as_ref()).await?;
    Ok(Json(results))
}

pub async fn my_score_sheets(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<ScoreSheet>>> {
    let sheets = ResultsService::my_score_sheets(state.db(), &user, &slug).await?;
    Ok(Json(sheets))
}

pub async fn get_score_sheet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ScoreSheet>> {
    let sheet = ResultsService::get_score_sheet(state.db(), &user, &id).await?;
    Ok(Json(sheet))
}

pub async fn put_score_sheet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScoreSheetRequest>,
) -> AppResult<Json<ScoreSheet>> {
    payload.validate()?;
    let sheet = ResultsService::save_score_sheet(state.db(), &user, &id, &payload).await?;
    Ok(Json(sheet))
}
