//! User profile handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;

use axum::{routing::get, Router};

use crate::{handlers::judges, state::AppState};

/// The caller's own profile and judge certification
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handler::get_profile).put(handler::update_profile))
        .merge(judges::certification_routes())
}
