//! Staff handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Staff routes; each handler checks the role
pub fn routes() -> Router<AppState> {
    Router::new()
        // Contests
        .route("/contests", get(handler::list_contests).post(handler::create_contest))
        .route("/contests/{slug}", put(handler::update_contest))
        .route("/contests/{slug}/stats", get(handler::contest_stats))
        .route("/contests/{slug}/participants", get(handler::list_participants))
        .route("/contests/{slug}/receive", post(handler::receive_entries))
        .route("/contests/{slug}/best-of-show", put(handler::set_best_of_show))
        .route("/contests/{slug}/categories", post(handler::add_category))
        .route("/contests/{slug}/judges", get(handler::list_judge_applications))
        .route("/contests/{slug}/judges/approve", post(handler::approve_judges))
        .route("/contests/{slug}/judges/reject", post(handler::reject_judges))
        // Categories
        .route(
            "/categories/{id}",
            put(handler::update_category).delete(handler::remove_category),
        )
        .route("/categories/{id}/final-round", get(handler::final_round_status))
        // Entries
        .route("/entries/{id}/place", put(handler::set_place))
        // Payments
        .route("/payments/pending", get(handler::list_pending_payments))
        .route("/payments/{id}/confirm", post(handler::confirm_payment))
        // Rebate codes
        .route(
            "/rebate-codes",
            get(handler::list_rebate_codes).post(handler::create_rebate_codes),
        )
        // Users
        .route("/users/{id}/role", put(handler::update_user_role))
        // Styles
        .route("/styles", get(handler::list_styles).post(handler::create_style))
        .route(
            "/styles/{id}",
            put(handler::update_style).delete(handler::delete_style),
        )
}
