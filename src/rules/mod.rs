//! Competition rules
//!
//! Pure decision logic, kept free of I/O so services can feed it counts
//! and rows read inside their transactions.

pub mod capacity;
pub mod judging;
pub mod payment;

pub use capacity::{EntryFields, EntryWrite, LimitViolation, Occupancy};
pub use judging::{DenialReason, PolicyDecision};
pub use payment::{Transition, TransitionEffects, TransitionError};
