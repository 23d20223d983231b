//! Entry handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::get,
    Router,
};

use crate::state::AppState;

/// Entry routes scoped to a contest, nested under `/contests`
pub fn contest_routes() -> Router<AppState> {
    Router::new().route(
        "/{slug}/entries",
        get(handler::list_my_entries).post(handler::create_entry),
    )
}

/// Routes addressing a single entry
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(handler::get_entry)
            .put(handler::update_entry)
            .delete(handler::delete_entry),
    )
}
