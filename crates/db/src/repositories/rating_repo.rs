//! Repository for the `ratings` table.

use deskpilot_core::types::DbId;

use crate::models::rating::{CreateRating, Rating};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ticket_id, solution_id, user_id, moderator_id, rating, \
                       clarity, helpfulness, completeness, timeliness, was_helpful, \
                       issue_resolved, would_recommend, feedback, improvement_suggestions, \
                       additional_help_needed, additional_help_description, is_anonymous, \
                       created_at";

/// Provides writes and lookups for ratings.
pub struct RatingRepo;

impl RatingRepo {
    /// Insert a rating.
    ///
    /// The `uq_ratings_ticket_id_user_id` constraint rejects a second
    /// rating from the same user for the same ticket; callers map that to
    /// a domain conflict and the first rating is left unchanged.
    pub async fn create(
        pool: &DbPool,
        input: &CreateRating,
        solution_id: DbId,
        user_id: DbId,
        moderator_id: DbId,
    ) -> Result<Rating, sqlx::Error> {
        let query = format!(
            "INSERT INTO ratings
                (ticket_id, solution_id, user_id, moderator_id, rating,
                 clarity, helpfulness, completeness, timeliness, was_helpful,
                 issue_resolved, would_recommend, feedback, improvement_suggestions,
                 additional_help_needed, additional_help_description, is_anonymous)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(input.ticket_id)
            .bind(solution_id)
            .bind(user_id)
            .bind(moderator_id)
            .bind(input.rating)
            .bind(input.clarity)
            .bind(input.helpfulness)
            .bind(input.completeness)
            .bind(input.timeliness)
            .bind(input.was_helpful)
            .bind(input.issue_resolved)
            .bind(input.would_recommend)
            .bind(&input.feedback)
            .bind(&input.improvement_suggestions)
            .bind(input.additional_help_needed)
            .bind(&input.additional_help_description)
            .bind(input.is_anonymous)
            .fetch_one(pool)
            .await
    }

    /// Find a rating by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ratings WHERE id = $1");
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether this user already rated this ticket's solution.
    pub async fn exists_for_ticket_user(
        pool: &DbPool,
        ticket_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ratings WHERE ticket_id = $1 AND user_id = $2",
        )
        .bind(ticket_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }
}
