//! Tacom - competition management for mead and homebrew contests
//!
//! Participants register entries into contest categories, pay for them and
//! ship them in packages; judges apply, score the entries and staff publish
//! the results.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Rules**: Pure competition rules (capacity, judging policy, payment transitions)
//! - **Repositories**: Database access
//! - **Gateway**: PayU client
//! - **Models**: Domain models

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rules;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
