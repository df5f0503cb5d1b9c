//! Ticket entity model and DTOs.

use deskpilot_core::status::{Priority, TicketStatus};
use deskpilot_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full ticket row from the `tickets` table.
///
/// The set-once timestamps (`completed_at`, `assigned_at`,
/// `first_response_at`) and `solution_id` are only ever written through the
/// conditional updates in `TicketRepo`; nothing resets them, including a
/// reopen.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: TicketStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub last_updated_by: Option<DbId>,
    pub solution_id: Option<DbId>,
    pub triage_notes: String,
    pub required_skills: Vec<String>,
    pub satisfaction_rating: Option<i16>,
    pub is_rated: bool,
    pub rating_id: Option<DbId>,
    pub needs_follow_up: bool,
    pub created_at: Timestamp,
    pub last_updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub assigned_at: Option<Timestamp>,
    pub first_response_at: Option<Timestamp>,
}

/// Input for creating a ticket.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicket {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub created_by: DbId,
}

/// A row from the append-only `ticket_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketComment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub is_internal: bool,
    pub created_at: Timestamp,
}

/// Input for appending a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 1000))]
    pub body: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Per-status/per-priority ticket counts for reporting.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct TicketStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub high_priority: i64,
    pub medium_priority: i64,
    pub low_priority: i64,
}
