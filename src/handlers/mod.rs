//! HTTP Request Handlers
//!
//! Handlers are organized by domain. Each module exposes the routers it
//! contributes; this module decides which of them require a token.

pub mod admin;
pub mod auth;
pub mod contests;
pub mod entries;
pub mod health;
pub mod judges;
pub mod packages;
pub mod payments;
pub mod results;
pub mod styles;
pub mod users;

use axum::{middleware, Router};

use crate::{
    middleware::{auth_middleware, optional_auth_middleware},
    state::AppState,
};

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);
    let optional_auth = middleware::from_fn_with_state(state, optional_auth_middleware);

    let public_contests = contests::routes()
        .merge(results::public_routes())
        .route_layer(optional_auth);

    let member_contests = entries::contest_routes()
        .merge(payments::contest_routes())
        .merge(judges::contest_routes())
        .merge(results::contest_routes())
        .route_layer(require_auth.clone());

    Router::new()
        .merge(health::routes())
        .nest(
            "/auth",
            auth::public_routes().merge(auth::routes().route_layer(require_auth.clone())),
        )
        .nest("/users", users::routes().route_layer(require_auth.clone()))
        .nest("/styles", styles::routes())
        .nest("/contests", public_contests.merge(member_contests))
        .nest(
            "/entries",
            entries::routes()
                .merge(results::entry_routes())
                .route_layer(require_auth.clone()),
        )
        .nest("/packages", packages::routes().route_layer(require_auth.clone()))
        .nest(
            "/payments",
            payments::routes()
                .route_layer(require_auth.clone())
                .merge(payments::webhook_routes()),
        )
        .nest("/admin", admin::routes().route_layer(require_auth))
}
