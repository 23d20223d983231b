//! User handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    db::repositories::user_repo::ProfileUpdate,
    error::{AppError, AppResult},
    middleware::AuthenticatedUser,
    services::UserService,
    state::AppState,
    utils::{sanitize_string, validate_language},
};

use super::{request::UpdateProfileRequest, response::UserResponse};

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserService::get_user_by_id(state.db(), &user.id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Edit the caller's profile, redeeming a rebate code when one is given
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;
    if let Some(language) = payload.language.as_deref() {
        validate_language(language).map_err(|m| AppError::InvalidField {
            field: "language".to_string(),
            message: m.to_string(),
        })?;
    }

    let clean = |v: &Option<String>| v.as_deref().map(sanitize_string);
    let first_name = clean(&payload.first_name);
    let last_name = clean(&payload.last_name);
    let country = clean(&payload.country);
    let phone = clean(&payload.phone);
    let address = clean(&payload.address);

    let update = ProfileUpdate {
        first_name: first_name.as_deref(),
        last_name: last_name.as_deref(),
        country: country.as_deref(),
        phone: phone.as_deref(),
        address: address.as_deref(),
        language: payload.language.as_deref(),
        rebate_code_text: payload.rebate_code_text.as_deref(),
    };

    let user = UserService::update_profile(state.db(), &user.id, update).await?;
    Ok(Json(UserResponse::from(&user)))
}
