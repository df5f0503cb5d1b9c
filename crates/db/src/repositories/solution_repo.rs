//! Repository for the `solutions` table.

use deskpilot_core::status::Effectiveness;
use deskpilot_core::types::DbId;
use sqlx::types::Json;

use crate::models::solution::{CreateSolution, Solution, SolutionStats};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ticket_id, moderator_id, body, steps, resources, tags, \
                       difficulty, effectiveness, time_to_resolve_hours, user_feedback, \
                       created_at, updated_at";

/// Provides writes and lookups for solutions.
pub struct SolutionRepo;

impl SolutionRepo {
    /// Insert a solution for a ticket.
    ///
    /// The `uq_solutions_ticket_id` constraint rejects a second solution
    /// for the same ticket; callers map that to a domain conflict.
    pub async fn create(
        pool: &DbPool,
        input: &CreateSolution,
        moderator_id: DbId,
        time_to_resolve_hours: i64,
    ) -> Result<Solution, sqlx::Error> {
        let query = format!(
            "INSERT INTO solutions
                (ticket_id, moderator_id, body, steps, resources, tags,
                 difficulty, time_to_resolve_hours)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Solution>(&query)
            .bind(input.ticket_id)
            .bind(moderator_id)
            .bind(&input.body)
            .bind(Json(&input.steps))
            .bind(Json(&input.resources))
            .bind(&input.tags)
            .bind(input.difficulty.as_str())
            .bind(time_to_resolve_hours)
            .fetch_one(pool)
            .await
    }

    /// Find a solution by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Solution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM solutions WHERE id = $1");
        sqlx::query_as::<_, Solution>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the solution for a ticket, if one exists.
    pub async fn find_by_ticket(
        pool: &DbPool,
        ticket_id: DbId,
    ) -> Result<Option<Solution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM solutions WHERE ticket_id = $1");
        sqlx::query_as::<_, Solution>(&query)
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the derived effectiveness and the rater's feedback text.
    pub async fn set_effectiveness(
        pool: &DbPool,
        id: DbId,
        effectiveness: Effectiveness,
        user_feedback: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE solutions SET
                effectiveness = $2,
                user_feedback = $3,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(effectiveness.as_str())
        .bind(user_feedback)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Aggregate solution and rating numbers, optionally scoped to one
    /// moderator. Reporting only.
    pub async fn stats(
        pool: &DbPool,
        moderator_id: Option<DbId>,
    ) -> Result<SolutionStats, sqlx::Error> {
        sqlx::query_as::<_, SolutionStats>(
            "SELECT
                COUNT(*) AS total_solutions,
                AVG(time_to_resolve_hours)::float8 AS average_time_to_resolve,
                COUNT(*) FILTER (WHERE effectiveness = 'helpful') AS helpful,
                COUNT(*) FILTER (WHERE effectiveness = 'partially_helpful') AS partially_helpful,
                COUNT(*) FILTER (WHERE effectiveness = 'not_helpful') AS not_helpful,
                (SELECT AVG(rating)::float8 FROM ratings
                  WHERE $1::bigint IS NULL OR moderator_id = $1) AS average_rating
             FROM solutions
             WHERE $1::bigint IS NULL OR moderator_id = $1",
        )
        .bind(moderator_id)
        .fetch_one(pool)
        .await
    }
}
