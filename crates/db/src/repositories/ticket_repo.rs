//! Repository for the `tickets` and `ticket_comments` tables.
//!
//! Compound invariants ("set `completed_at` only if null") are enforced by
//! making the write itself conditional (`COALESCE`, `WHERE ... IS NULL`),
//! never by reading first. Concurrent handlers for the same ticket can
//! interleave freely; re-applying any of these writes is idempotent.

use deskpilot_core::status::{Priority, TicketStatus};
use deskpilot_core::types::DbId;

use crate::models::ticket::{CreateComment, CreateTicket, Ticket, TicketComment, TicketStats};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, priority, created_by, assigned_to, \
                       last_updated_by, solution_id, triage_notes, required_skills, \
                       satisfaction_rating, is_rated, rating_id, needs_follow_up, \
                       created_at, last_updated_at, completed_at, assigned_at, first_response_at";

const COMMENT_COLUMNS: &str = "id, ticket_id, author_id, body, is_internal, created_at";

/// Provides lifecycle writes and lookups for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new ticket in the initial OPEN state, returning the row.
    pub async fn create(pool: &DbPool, input: &CreateTicket) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (title, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a ticket by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the ticket status.
    ///
    /// On the first transition into RESOLVED this also stamps
    /// `completed_at`; the `COALESCE` keeps it sticky on every later
    /// RESOLVED write and across reopens. Returns `None` if no such ticket.
    pub async fn set_status(
        pool: &DbPool,
        id: DbId,
        status: TicketStatus,
        updated_by: Option<DbId>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                status = $2,
                completed_at = CASE WHEN $2 = 'RESOLVED'
                                    THEN COALESCE(completed_at, NOW())
                                    ELSE completed_at END,
                last_updated_by = COALESCE($3, last_updated_by),
                last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Persist triage output and move the ticket into IN_PROGRESS.
    pub async fn apply_triage(
        pool: &DbPool,
        id: DbId,
        priority: Priority,
        notes: &str,
        skills: &[String],
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                priority = $2,
                triage_notes = $3,
                required_skills = $4,
                status = 'IN_PROGRESS',
                last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(priority.as_str())
            .bind(notes)
            .bind(skills)
            .fetch_optional(pool)
            .await
    }

    /// Assign the ticket to a moderator.
    ///
    /// `assigned_at` is stamped only on the first assignment; reassigning
    /// later leaves it untouched.
    pub async fn assign(
        pool: &DbPool,
        id: DbId,
        moderator_id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                assigned_to = $2,
                assigned_at = COALESCE(assigned_at, NOW()),
                last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(moderator_id)
            .fetch_optional(pool)
            .await
    }

    /// Reassign (or unassign, with `None`) the ticket.
    pub async fn reassign(
        pool: &DbPool,
        id: DbId,
        new_assignee: Option<DbId>,
        updated_by: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                assigned_to = $2,
                assigned_at = CASE WHEN $2 IS NULL
                                   THEN assigned_at
                                   ELSE COALESCE(assigned_at, NOW()) END,
                last_updated_by = $3,
                last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(new_assignee)
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Set the ticket priority (moderator/admin override of triage).
    pub async fn set_priority(
        pool: &DbPool,
        id: DbId,
        priority: Priority,
        updated_by: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                priority = $2,
                last_updated_by = $3,
                last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(priority.as_str())
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Link a freshly created solution and resolve the ticket in one
    /// conditional write.
    ///
    /// The `solution_id IS NULL` guard makes the link set-once: a second
    /// attempt affects zero rows and returns `false`.
    pub async fn link_solution(
        pool: &DbPool,
        id: DbId,
        solution_id: DbId,
        moderator_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET
                solution_id = $2,
                status = 'RESOLVED',
                completed_at = COALESCE(completed_at, NOW()),
                last_updated_by = $3,
                last_updated_at = NOW()
             WHERE id = $1 AND solution_id IS NULL",
        )
        .bind(id)
        .bind(solution_id)
        .bind(moderator_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the satisfaction outcome of a rating on the ticket.
    pub async fn record_rating(
        pool: &DbPool,
        id: DbId,
        rating: i16,
        rating_id: DbId,
        needs_follow_up: bool,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                satisfaction_rating = $2,
                is_rated = true,
                rating_id = $3,
                needs_follow_up = $4,
                last_updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(rating)
            .bind(rating_id)
            .bind(needs_follow_up)
            .fetch_optional(pool)
            .await
    }

    /// Append a comment to the ticket's log.
    pub async fn add_comment(
        pool: &DbPool,
        ticket_id: DbId,
        author_id: DbId,
        input: &CreateComment,
    ) -> Result<TicketComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_comments (ticket_id, author_id, body, is_internal)
             VALUES ($1, $2, $3, $4)
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .bind(author_id)
            .bind(&input.body)
            .bind(input.is_internal)
            .fetch_one(pool)
            .await
    }

    /// Stamp `first_response_at` if it has never been set.
    pub async fn touch_first_response(pool: &DbPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tickets SET first_response_at = NOW()
             WHERE id = $1 AND first_response_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All comments for a ticket, oldest first.
    pub async fn list_comments(
        pool: &DbPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM ticket_comments
             WHERE ticket_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Ticket counts by status and priority, optionally scoped to one
    /// creator. Reporting only.
    pub async fn stats(
        pool: &DbPool,
        created_by: Option<DbId>,
    ) -> Result<TicketStats, sqlx::Error> {
        sqlx::query_as::<_, TicketStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'OPEN') AS open,
                COUNT(*) FILTER (WHERE status = 'IN_PROGRESS') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'RESOLVED') AS resolved,
                COUNT(*) FILTER (WHERE priority = 'high') AS high_priority,
                COUNT(*) FILTER (WHERE priority = 'medium') AS medium_priority,
                COUNT(*) FILTER (WHERE priority = 'low') AS low_priority
             FROM tickets
             WHERE $1::bigint IS NULL OR created_by = $1",
        )
        .bind(created_by)
        .fetch_one(pool)
        .await
    }
}
