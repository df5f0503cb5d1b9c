//! Persistence layer: sqlx/Postgres models and repositories.
//!
//! Repositories are zero-sized structs with async methods that take a
//! [`DbPool`] as their first argument. Set-once fields (`completed_at`,
//! `assigned_at`, `first_response_at`, `solution_id`) are written with
//! conditional SQL so concurrent handlers for the same ticket can never
//! race a read-then-write.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

/// Shared connection pool type.
pub type DbPool = sqlx::PgPool;

/// Default maximum pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connect to Postgres and build the shared pool.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity probe.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// If `err` is a Postgres unique-constraint violation, return the
/// constraint name so callers can map it to a domain conflict.
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            Some(db_err.constraint().unwrap_or("unknown").to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_ignores_non_database_errors() {
        assert!(unique_violation(&sqlx::Error::RowNotFound).is_none());
    }
}
