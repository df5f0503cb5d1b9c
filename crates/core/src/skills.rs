//! Skill matching for moderator assignment.
//!
//! Matching is case-insensitive substring containment: a moderator whose
//! skill list has "PostgreSQL" satisfies a required "postgres". The
//! `"General Support"` sentinel is what triage falls back to when it cannot
//! name concrete skills, so a list equal to the sentinel is treated as
//! "no searchable skills" and assignment skips straight to the any-moderator
//! fallback.

/// Skill the triage fallback assigns when no concrete skills are known.
pub const GENERAL_SUPPORT: &str = "General Support";

/// Whether a required-skill list is worth a targeted moderator search.
pub fn has_searchable_skills(required: &[String]) -> bool {
    !required.is_empty() && required != [GENERAL_SUPPORT]
}

/// Whether a candidate's skill list satisfies any of the required skills.
pub fn matches_any(required: &[String], candidate_skills: &[String]) -> bool {
    required.iter().any(|req| {
        let req = req.to_lowercase();
        !req.is_empty()
            && candidate_skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(&req))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn case_insensitive_equality_matches() {
        assert!(matches_any(
            &skills(&["Postgres"]),
            &skills(&["postgres", "go"])
        ));
    }

    #[test]
    fn substring_containment_matches() {
        assert!(matches_any(&skills(&["postgres"]), &skills(&["PostgreSQL"])));
    }

    #[test]
    fn disjoint_lists_do_not_match() {
        assert!(!matches_any(&skills(&["React"]), &skills(&["postgres", "go"])));
    }

    #[test]
    fn empty_required_never_matches() {
        assert!(!matches_any(&[], &skills(&["postgres"])));
    }

    #[test]
    fn sentinel_list_is_not_searchable() {
        assert!(!has_searchable_skills(&skills(&[GENERAL_SUPPORT])));
        assert!(!has_searchable_skills(&[]));
    }

    #[test]
    fn concrete_skills_are_searchable() {
        assert!(has_searchable_skills(&skills(&["Docker"])));
        // Sentinel alongside a concrete skill still searchable.
        assert!(has_searchable_skills(&skills(&[GENERAL_SUPPORT, "Docker"])));
    }
}
