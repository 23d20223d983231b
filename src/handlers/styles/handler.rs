//! Style handler implementations

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{error::{AppError, AppResult}, models::Style, services::StyleService, state::AppState};

/// Styles offered to participants
pub async fn list_styles(State(state): State<AppState>) -> AppResult<Json<Vec<Style>>> {
    let styles = StyleService::list(state.db(), true).await?;
    Ok(Json(styles))
}

pub async fn get_style(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Style>> {
    let style = StyleService::get(state.db(), &id).await?;
    if !style.show {
        return Err(AppError::NotFound("Style not found".to_string()));
    }
    Ok(Json(style))
}
