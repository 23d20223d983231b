//! Entries package handlers

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

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_package))
        .route("/{id}", get(handler::get_package))
        .route("/{id}/labels", get(handler::get_labels))
}
