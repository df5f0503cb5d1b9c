//! Solution entity model and DTOs.

use deskpilot_core::status::{Difficulty, Effectiveness};
use deskpilot_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// One ordered step of a step-by-step guide. Stored as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionStep {
    pub description: String,
    #[serde(default)]
    pub code_example: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// An external reference attached to a solution. Stored as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionResource {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Full solution row from the `solutions` table. At most one per ticket
/// (`uq_solutions_ticket_id`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Solution {
    pub id: DbId,
    pub ticket_id: DbId,
    pub moderator_id: DbId,
    pub body: String,
    pub steps: Json<Vec<SolutionStep>>,
    pub resources: Json<Vec<SolutionResource>>,
    pub tags: Vec<String>,
    #[sqlx(try_from = "String")]
    pub difficulty: Difficulty,
    #[sqlx(try_from = "String")]
    pub effectiveness: Effectiveness,
    pub time_to_resolve_hours: i64,
    pub user_feedback: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for submitting a solution.
///
/// `time_to_resolve_hours` is computed by the caller from the ticket's
/// creation time, never supplied by the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSolution {
    pub ticket_id: DbId,
    #[validate(length(min = 10, max = 5000))]
    pub body: String,
    #[serde(default)]
    pub steps: Vec<SolutionStep>,
    #[serde(default)]
    pub resources: Vec<SolutionResource>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

/// Aggregate solution/rating numbers for reporting.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct SolutionStats {
    pub total_solutions: i64,
    pub average_time_to_resolve: Option<f64>,
    pub helpful: i64,
    pub partially_helpful: i64,
    pub not_helpful: i64,
    pub average_rating: Option<f64>,
}
