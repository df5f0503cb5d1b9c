//! Domain vocabulary for the deskpilot ticket platform.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the pipeline, and any future CLI tooling alike:
//!
//! - [`status`]: closed status/priority/difficulty/effectiveness enums.
//! - [`lifecycle`]: the ticket status state machine and the derived-field
//!   rules (effectiveness, time-to-resolve rounding, first response).
//! - [`skills`]: case-insensitive skill matching used by moderator
//!   assignment.
//! - [`roles`]: well-known role name constants.
//! - [`error`]: the shared domain error type.

pub mod error;
pub mod lifecycle;
pub mod roles;
pub mod skills;
pub mod status;
pub mod types;

pub use error::CoreError;
pub use status::{Difficulty, Effectiveness, Priority, TicketStatus};
pub use types::{DbId, Timestamp};
