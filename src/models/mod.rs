//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod contest;
pub mod entry;
pub mod judge;
pub mod payment;
pub mod score_sheet;
pub mod style;
pub mod user;

pub use contest::*;
pub use entry::*;
pub use judge::*;
pub use payment::*;
pub use score_sheet::*;
pub use style::*;
pub use user::*;

/// A text column held a value no enum variant matches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
