//! Scoring and results handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Public results, nested under `/contests`
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/{slug}/results", get(handler::get_results))
}

/// The caller's sheets in a contest, nested under `/contests`
pub fn contest_routes() -> Router<AppState> {
    Router::new().route("/{slug}/score-sheets", get(handler::my_score_sheets))
}

/// Sheet of a single entry, nested under `/entries`
pub fn entry_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}/score-sheet",
        get(handler::get_score_sheet).put(handler::put_score_sheet),
    )
}
