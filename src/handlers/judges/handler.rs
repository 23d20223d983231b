//! Judge handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppResult,
    middleware::AuthenticatedUser,
    models::{JudgeCertification, JudgeInCompetition},
    services::JudgeService,
    state::AppState,
};

use super::{request::CertificationRequest, response::ApplicationStatusResponse};

pub async fn get_certification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<JudgeCertification>> {
    let cert = JudgeService::get_certification(state.db(), &user.id).await?;
    Ok(Json(cert))
}

/// Save the certification form; an empty form clears it (204)
pub async fn put_certification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CertificationRequest>,
) -> AppResult<Response> {
    let response = match JudgeService::save_certification(state.db(), &user.id, payload).await? {
        Some(cert) => Json(cert).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };
    Ok(response)
}

pub async fn delete_certification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    JudgeService::delete_certification(state.db(), &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn application_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ApplicationStatusResponse>> {
    let status = JudgeService::application_status(state.db(), &user, &slug).await?;
    Ok(Json(status))
}

pub async fn apply(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<JudgeInCompetition>)> {
    let application = JudgeService::apply(state.db(), &user, &slug).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    JudgeService::withdraw(state.db(), &user, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
