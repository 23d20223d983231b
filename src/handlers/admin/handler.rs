//! Staff handler implementations
//!
//! Every handler starts by checking the caller's role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::repositories::{judge_repo::ApplicationRow, user_repo::ParticipantRow},
    error::{AppError, AppResult},
    handlers::{
        contests::{
            request::{CategoryRequest, ContestRequest, ListContestsQuery, UpdateCategoryRequest},
            response::{ContestListResponse, ContestResponse, FinalRoundResponse},
        },
        entries::request::PlaceRequest,
        judges::{
            request::{ApplicationsQuery, DecideApplicationsRequest},
            response::DecisionResponse,
        },
        payments::request::PendingPaymentsQuery,
        results::request::BestOfShowRequest,
        styles::request::StyleRequest,
        users::response::UserResponse,
    },
    middleware::AuthenticatedUser,
    models::{Category, Contest, Entry, EntryStats, JudgeStatus, Payment, RebateCode, Style},
    services::{
        ContestService, EntryService, JudgeService, PaymentService, ResultsService, StyleService,
        UserService,
    },
    state::AppState,
    utils::validation::validate_role,
};

use super::{
    request::{EntryIdsRequest, RebateCodesRequest, UpdateUserRoleRequest},
    response::BulkUpdateResponse,
};

// Contests

pub async fn list_contests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListContestsQuery>,
) -> AppResult<Json<ContestListResponse>> {
    user.require_staff()?;
    let response = ContestService::list_all(state.db(), query.page, query.per_page).await?;
    Ok(Json(response))
}

pub async fn create_contest(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<ContestRequest>,
) -> AppResult<(StatusCode, Json<ContestResponse>)> {
    user.require_staff()?;
    payload.validate()?;
    let contest = ContestService::create_contest(state.db(), &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(contest)))
}

pub async fn update_contest(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<ContestRequest>,
) -> AppResult<Json<ContestResponse>> {
    user.require_staff()?;
    payload.validate()?;
    let contest = ContestService::update_contest(state.db(), &slug, payload).await?;
    Ok(Json(contest))
}

pub async fn contest_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<Json<EntryStats>> {
    user.require_staff()?;
    let stats = EntryService::contest_stats(state.db(), &slug).await?;
    Ok(Json(stats))
}

pub async fn list_participants(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<ParticipantRow>>> {
    user.require_staff()?;
    let contest = ContestService::find_by_slug(state.db(), &slug).await?;
    let participants = UserService::list_participants(state.db(), &contest.id).await?;
    Ok(Json(participants))
}

/// Mark delivered bottles received
pub async fn receive_entries(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<EntryIdsRequest>,
) -> AppResult<Json<BulkUpdateResponse>> {
    user.require_staff()?;
    payload.validate()?;
    let updated = EntryService::mark_received(state.db(), &slug, &payload.entry_ids).await?;
    Ok(Json(BulkUpdateResponse {
        requested: payload.entry_ids.len(),
        updated,
    }))
}

pub async fn set_best_of_show(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<BestOfShowRequest>,
) -> AppResult<Json<Contest>> {
    user.require_staff()?;
    let contest = ResultsService::set_best_of_show(state.db(), &slug, payload.entry_id).await?;
    Ok(Json(contest))
}

// Categories

pub async fn add_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    user.require_staff()?;
    payload.validate()?;
    let category = ContestService::add_category(state.db(), &slug, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<Category>> {
    user.require_staff()?;
    payload.validate()?;
    let category = ContestService::update_category(state.db(), &id, payload.entries_limit).await?;
    Ok(Json(category))
}

pub async fn remove_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    ContestService::remove_category(state.db(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn final_round_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FinalRoundResponse>> {
    user.require_staff()?;
    let status = ContestService::final_round_status(state.db(), &id).await?;
    Ok(Json(status))
}

// Entries

/// Rank an entry in its category final
pub async fn set_place(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaceRequest>,
) -> AppResult<Json<Entry>> {
    user.require_staff()?;
    payload.validate()?;
    let entry = EntryService::set_place(state.db(), &user, &id, payload.place).await?;
    Ok(Json(entry))
}

// Payments

pub async fn list_pending_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PendingPaymentsQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    user.require_staff()?;
    let payments = PaymentService::list_pending(state.db(), query.contest.as_deref()).await?;
    Ok(Json(payments))
}

/// Staff saw the bank transfer
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    user.require_staff()?;
    let payment = PaymentService::confirm_transfer(state.db(), state.notifier(), &id).await?;
    Ok(Json(payment))
}

// Judges

pub async fn list_judge_applications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Query(query): Query<ApplicationsQuery>,
) -> AppResult<Json<Vec<ApplicationRow>>> {
    user.require_staff()?;
    let applications = JudgeService::list_applications(state.db(), &slug, query.status).await?;
    Ok(Json(applications))
}

async fn decide_applications(
    state: &AppState,
    user: &AuthenticatedUser,
    slug: &str,
    payload: &DecideApplicationsRequest,
    status: JudgeStatus,
) -> AppResult<Json<DecisionResponse>> {
    user.require_staff()?;
    payload.validate()?;
    let updated = JudgeService::decide(state.db(), slug, &payload.ids, status).await?;
    Ok(Json(DecisionResponse { status, updated }))
}

pub async fn approve_judges(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<DecideApplicationsRequest>,
) -> AppResult<Json<DecisionResponse>> {
    decide_applications(&state, &user, &slug, &payload, JudgeStatus::Approved).await
}

pub async fn reject_judges(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<DecideApplicationsRequest>,
) -> AppResult<Json<DecisionResponse>> {
    decide_applications(&state, &user, &slug, &payload, JudgeStatus::Rejected).await
}

// Rebate codes

pub async fn create_rebate_codes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<RebateCodesRequest>,
) -> AppResult<(StatusCode, Json<Vec<RebateCode>>)> {
    user.require_staff()?;
    payload.validate()?;
    let codes = UserService::create_rebate_codes(state.db(), payload.count as usize).await?;
    Ok((StatusCode::CREATED, Json(codes)))
}

pub async fn list_rebate_codes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<RebateCode>>> {
    user.require_staff()?;
    let codes = UserService::list_rebate_codes(state.db()).await?;
    Ok(Json(codes))
}

// Users

pub async fn update_user_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    user.require_staff()?;
    payload.validate()?;
    validate_role(&payload.role).map_err(|m| AppError::InvalidField {
        field: "role".to_string(),
        message: m.to_string(),
    })?;
    if id == user.id {
        return Err(AppError::Forbidden("Cannot change your own role".to_string()));
    }

    let updated = UserService::set_role(state.db(), &id, &payload.role).await?;
    Ok(Json(UserResponse::from(&updated)))
}

// Styles

pub async fn list_styles(State(state): State<AppState>, user: AuthenticatedUser) -> AppResult<Json<Vec<Style>>> {
    user.require_staff()?;
    let styles = StyleService::list(state.db(), false).await?;
    Ok(Json(styles))
}

pub async fn create_style(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<StyleRequest>,
) -> AppResult<(StatusCode, Json<Style>)> {
    user.require_staff()?;
    payload.validate()?;
    let style = StyleService::create(state.db(), payload.as_input(), &user.id).await?;
    Ok((StatusCode::CREATED, Json(style)))
}

pub async fn update_style(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StyleRequest>,
) -> AppResult<Json<Style>> {
    user.require_staff()?;
    payload.validate()?;
    let style = StyleService::update(state.db(), &id, payload.as_input()).await?;
    Ok(Json(style))
}

pub async fn delete_style(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_staff()?;
    StyleService::delete(state.db(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
