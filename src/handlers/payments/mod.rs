//! Payment handlers

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

/// Payment routes scoped to a contest, nested under `/contests`
pub fn contest_routes() -> Router<AppState> {
    Router::new().route(
        "/{slug}/payments",
        get(handler::list_my_payments).post(handler::create_payment),
    )
}

/// Routes addressing a single payment
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(handler::get_payment).delete(handler::cancel_payment))
        .route("/{id}/fake", post(handler::fake_payment))
        .route("/{id}/payu", post(handler::start_payu))
}

/// Gateway callbacks, reachable without a token
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payu/notify", post(handler::payu_notify))
}
