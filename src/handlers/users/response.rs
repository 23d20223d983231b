//! User response DTOs

pub use crate::handlers::auth::response::UserResponse;
