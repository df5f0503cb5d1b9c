//! Repository for the `users` table (read-only from this core).

use deskpilot_core::types::DbId;

use crate::models::user::User;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, role, skills, is_active, created_at";

/// Read access to users for assignment and notification addressing.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All active users with the given role, oldest account first.
    ///
    /// Deterministic ordering keeps moderator assignment reproducible when
    /// several candidates match.
    pub async fn list_active_by_role(pool: &DbPool, role: &str) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE role = $1 AND is_active = true ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }

    /// First active user with the given role, if any.
    pub async fn first_active_by_role(
        pool: &DbPool,
        role: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE role = $1 AND is_active = true ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_optional(pool)
            .await
    }
}
