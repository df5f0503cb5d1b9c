//! Skill-based moderator selection.
//!
//! The fallback chain, first match wins:
//!
//! 1. a moderator whose skills satisfy any required skill (skipped when
//!    the required list is empty or the `"General Support"` sentinel)
//! 2. any active moderator
//! 3. any active admin
//! 4. nobody: the ticket stays unassigned, which is a valid outcome
//!    the caller logs rather than fails on.

use deskpilot_core::roles::{ROLE_ADMIN, ROLE_MODERATOR};
use deskpilot_core::skills;
use deskpilot_db::models::user::User;
use deskpilot_db::repositories::UserRepo;
use deskpilot_db::DbPool;

/// Selects the best-available moderator for a set of required skills.
pub struct ModeratorMatcher;

impl ModeratorMatcher {
    /// Fetch the candidate pools and walk the fallback chain.
    pub async fn find(
        pool: &DbPool,
        required_skills: &[String],
    ) -> Result<Option<User>, sqlx::Error> {
        let moderators = UserRepo::list_active_by_role(pool, ROLE_MODERATOR).await?;
        let admins = if moderators.is_empty() {
            UserRepo::list_active_by_role(pool, ROLE_ADMIN).await?
        } else {
            Vec::new()
        };
        Ok(select(required_skills, &moderators, &admins).cloned())
    }
}

/// The deterministic fallback chain over already-fetched candidates.
///
/// No ranking among multiple skill matches; the first candidate in the
/// repository's deterministic order wins.
pub fn select<'a>(
    required: &[String],
    moderators: &'a [User],
    admins: &'a [User],
) -> Option<&'a User> {
    if skills::has_searchable_skills(required) {
        if let Some(matched) = moderators
            .iter()
            .find(|m| skills::matches_any(required, &m.skills))
        {
            tracing::debug!(moderator_id = matched.id, "Moderator matched on required skills");
            return Some(matched);
        }
    }
    moderators.first().or_else(|| admins.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use deskpilot_core::skills::GENERAL_SUPPORT;

    fn user(id: i64, role: &str, skill_list: &[&str]) -> User {
        User {
            id,
            email: format!("user{id}@example.com"),
            role: role.to_string(),
            skills: skill_list.iter().map(|s| s.to_string()).collect(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn required(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn case_insensitive_skill_match_selects_moderator() {
        let mods = vec![user(1, ROLE_MODERATOR, &["postgres", "go"])];
        let picked = select(&required(&["Postgres"]), &mods, &[]).unwrap();
        assert_eq!(picked.id, 1);
    }

    #[test]
    fn first_matching_moderator_wins() {
        let mods = vec![
            user(1, ROLE_MODERATOR, &["React"]),
            user(2, ROLE_MODERATOR, &["Docker"]),
            user(3, ROLE_MODERATOR, &["Docker", "Kubernetes"]),
        ];
        let picked = select(&required(&["docker"]), &mods, &[]).unwrap();
        assert_eq!(picked.id, 2);
    }

    #[test]
    fn no_skill_overlap_falls_back_to_any_moderator() {
        let mods = vec![
            user(1, ROLE_MODERATOR, &["React"]),
            user(2, ROLE_MODERATOR, &["Go"]),
        ];
        let picked = select(&required(&["Rust"]), &mods, &[]).unwrap();
        assert_eq!(picked.id, 1);
    }

    #[test]
    fn sentinel_skills_skip_the_search_step() {
        // The second moderator literally lists the sentinel as a skill;
        // the chain must not search, it takes the first moderator.
        let mods = vec![
            user(1, ROLE_MODERATOR, &["React"]),
            user(2, ROLE_MODERATOR, &[GENERAL_SUPPORT]),
        ];
        let picked = select(&required(&[GENERAL_SUPPORT]), &mods, &[]).unwrap();
        assert_eq!(picked.id, 1);
    }

    #[test]
    fn no_moderators_falls_back_to_admin() {
        let admins = vec![user(9, ROLE_ADMIN, &[])];
        let picked = select(&required(&[GENERAL_SUPPORT]), &[], &admins).unwrap();
        assert_eq!(picked.id, 9);
    }

    #[test]
    fn nobody_available_selects_none() {
        assert!(select(&required(&["Rust"]), &[], &[]).is_none());
        assert!(select(&[], &[], &[]).is_none());
    }
}
