//! Contest handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Public contest routes; the caller is identified when a token is sent
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_contests))
        .route("/{slug}", get(handler::get_contest))
        .route("/{slug}/categories", get(handler::list_categories))
}
