//! User entity model.
//!
//! Users are owned by the account service; this core only reads them for
//! assignment and notification addressing.

use deskpilot_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    /// One of the `deskpilot_core::roles` constants.
    pub role: String,
    pub skills: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}
