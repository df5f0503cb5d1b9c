//! Rating entity model and DTOs.

use deskpilot_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full rating row from the `ratings` table. Unique per (ticket, user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rating {
    pub id: DbId,
    pub ticket_id: DbId,
    pub solution_id: DbId,
    pub user_id: DbId,
    pub moderator_id: DbId,
    pub rating: i16,
    pub clarity: i16,
    pub helpfulness: i16,
    pub completeness: i16,
    pub timeliness: i16,
    pub was_helpful: bool,
    pub issue_resolved: bool,
    pub would_recommend: bool,
    pub feedback: String,
    pub improvement_suggestions: String,
    pub additional_help_needed: bool,
    pub additional_help_description: String,
    pub is_anonymous: bool,
    pub created_at: Timestamp,
}

impl Rating {
    /// Mean of the four category scores, for the moderator notice.
    pub fn category_average(&self) -> f64 {
        f64::from(self.clarity + self.helpfulness + self.completeness + self.timeliness) / 4.0
    }
}

/// Input for rating a solution.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRating {
    pub ticket_id: DbId,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(range(min = 1, max = 5))]
    pub clarity: i16,
    #[validate(range(min = 1, max = 5))]
    pub helpfulness: i16,
    #[validate(range(min = 1, max = 5))]
    pub completeness: i16,
    #[validate(range(min = 1, max = 5))]
    pub timeliness: i16,
    pub was_helpful: bool,
    pub issue_resolved: bool,
    #[serde(default)]
    pub would_recommend: bool,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub feedback: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub improvement_suggestions: String,
    #[serde(default)]
    pub additional_help_needed: bool,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub additional_help_description: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn category_average_is_mean_of_four_scores() {
        let rating = Rating {
            id: 1,
            ticket_id: 1,
            solution_id: 1,
            user_id: 1,
            moderator_id: 2,
            rating: 4,
            clarity: 5,
            helpfulness: 4,
            completeness: 3,
            timeliness: 4,
            was_helpful: true,
            issue_resolved: true,
            would_recommend: true,
            feedback: String::new(),
            improvement_suggestions: String::new(),
            additional_help_needed: false,
            additional_help_description: String::new(),
            is_anonymous: false,
            created_at: Utc::now(),
        };
        assert_eq!(rating.category_average(), 4.0);
    }
}
