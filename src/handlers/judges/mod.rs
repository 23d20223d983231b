//! Judge handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Judge application routes, nested under `/contests`
pub fn contest_routes() -> Router<AppState> {
    Router::new()
        .route("/{slug}/judges/application", get(handler::application_status))
        .route("/{slug}/judges/apply", post(handler::apply))
        .route("/{slug}/judges/withdraw", post(handler::withdraw))
}

/// The caller's certification, nested under `/users`
pub fn certification_routes() -> Router<AppState> {
    Router::new().route(
        "/me/certification",
        get(handler::get_certification)
            .put(handler::put_certification)
            .delete(handler::delete_certification),
    )
}
