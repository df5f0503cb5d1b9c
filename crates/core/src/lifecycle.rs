//! Ticket lifecycle rules.
//!
//! This module owns the status state machine and the derived-field rules
//! the pipeline and the repositories both depend on. Everything here is a
//! pure function; persistence of the results (including the set-once
//! timestamp writes) lives in the `db` crate.

use crate::status::{Effectiveness, TicketStatus};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Valid forward transitions for the normal ticket flow.
///
/// `Open -> InProgress` happens when triage and assignment complete;
/// `InProgress -> Resolved` when a solution is submitted or a moderator
/// closes the ticket; `InProgress -> Open` is the permitted reopen.
/// `Resolved` is terminal on the normal path. Moderators and admins can
/// bypass this via the explicit status-update override; see
/// [`requires_override`].
pub fn valid_transitions(from: TicketStatus) -> &'static [TicketStatus] {
    match from {
        TicketStatus::Open => &[TicketStatus::InProgress],
        TicketStatus::InProgress => &[TicketStatus::Resolved, TicketStatus::Open],
        TicketStatus::Resolved => &[],
    }
}

/// Check whether `from -> to` is a normal-flow transition.
pub fn can_transition(from: TicketStatus, to: TicketStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a normal-flow transition, with a readable message for rejects.
pub fn validate_transition(from: TicketStatus, to: TicketStatus) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!("Invalid ticket transition: {from} -> {to}"))
    }
}

/// Whether an explicit status set needs the moderator/admin escape hatch.
///
/// The status-update operation accepts any target status; transitions
/// outside the normal flow (e.g. reopening a resolved ticket, or jumping
/// straight to RESOLVED) are overrides and get logged as such.
pub fn requires_override(from: TicketStatus, to: TicketStatus) -> bool {
    from != to && !can_transition(from, to)
}

// ---------------------------------------------------------------------------
// Derived fields
// ---------------------------------------------------------------------------

/// Derive a solution's effectiveness from its rating.
///
/// A low score or an explicit "not helpful" dominates; a middling score or
/// an unresolved issue is partial; everything else is helpful. Runs exactly
/// once per rating since ratings are unique per (ticket, user).
pub fn derive_effectiveness(rating: i16, was_helpful: bool, issue_resolved: bool) -> Effectiveness {
    if rating <= 2 || !was_helpful {
        Effectiveness::NotHelpful
    } else if rating == 3 || !issue_resolved {
        Effectiveness::PartiallyHelpful
    } else {
        Effectiveness::Helpful
    }
}

/// Whether a rating outcome flags the ticket for follow-up.
pub fn needs_follow_up(issue_resolved: bool, additional_help_needed: bool) -> bool {
    !issue_resolved || additional_help_needed
}

/// Whole hours between ticket creation and solution submission,
/// round-half-up (2 h 30 m rounds to 3).
///
/// Computed in integer minutes to keep the rounding rule exact. Clock skew
/// can make the difference negative; clamp to zero rather than report a
/// negative duration.
pub fn time_to_resolve_hours(created_at: Timestamp, submitted_at: Timestamp) -> i64 {
    let minutes = (submitted_at - created_at).num_minutes().max(0);
    (minutes + 30) / 60
}

/// Whether a comment by a user with this role counts as the ticket's first
/// staff response (sets `first_response_at` once).
pub fn counts_as_first_response(role: &str) -> bool {
    role == crate::roles::ROLE_MODERATOR || role == crate::roles::ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    #[test]
    fn open_to_in_progress() {
        assert!(can_transition(TicketStatus::Open, TicketStatus::InProgress));
    }

    #[test]
    fn in_progress_to_resolved() {
        assert!(can_transition(TicketStatus::InProgress, TicketStatus::Resolved));
    }

    #[test]
    fn in_progress_reopen_permitted() {
        assert!(can_transition(TicketStatus::InProgress, TicketStatus::Open));
    }

    #[test]
    fn resolved_is_terminal_on_normal_path() {
        assert!(valid_transitions(TicketStatus::Resolved).is_empty());
    }

    #[test]
    fn open_cannot_skip_to_resolved() {
        assert!(!can_transition(TicketStatus::Open, TicketStatus::Resolved));
    }

    #[test]
    fn validate_transition_message_names_both_states() {
        let err = validate_transition(TicketStatus::Resolved, TicketStatus::Open).unwrap_err();
        assert!(err.contains("RESOLVED"));
        assert!(err.contains("OPEN"));
    }

    #[test]
    fn override_detection() {
        assert!(requires_override(TicketStatus::Resolved, TicketStatus::Open));
        assert!(requires_override(TicketStatus::Open, TicketStatus::Resolved));
        assert!(!requires_override(TicketStatus::Open, TicketStatus::InProgress));
        // Setting the same status again is a no-op, not an override.
        assert!(!requires_override(TicketStatus::Resolved, TicketStatus::Resolved));
    }

    // -----------------------------------------------------------------------
    // Effectiveness derivation
    // -----------------------------------------------------------------------

    #[test]
    fn low_rating_dominates_even_when_helpful_and_resolved() {
        assert_eq!(
            derive_effectiveness(1, true, true),
            Effectiveness::NotHelpful
        );
        assert_eq!(
            derive_effectiveness(2, true, true),
            Effectiveness::NotHelpful
        );
    }

    #[test]
    fn not_helpful_flag_dominates_high_rating() {
        assert_eq!(
            derive_effectiveness(5, false, true),
            Effectiveness::NotHelpful
        );
    }

    #[test]
    fn unresolved_issue_is_partial() {
        assert_eq!(
            derive_effectiveness(4, true, false),
            Effectiveness::PartiallyHelpful
        );
    }

    #[test]
    fn middling_rating_is_partial() {
        assert_eq!(
            derive_effectiveness(3, true, true),
            Effectiveness::PartiallyHelpful
        );
    }

    #[test]
    fn good_rating_helpful_and_resolved_is_helpful() {
        assert_eq!(derive_effectiveness(5, true, true), Effectiveness::Helpful);
        assert_eq!(derive_effectiveness(4, true, true), Effectiveness::Helpful);
    }

    #[test]
    fn follow_up_flag() {
        assert!(needs_follow_up(false, false));
        assert!(needs_follow_up(true, true));
        assert!(!needs_follow_up(true, false));
    }

    // -----------------------------------------------------------------------
    // Time to resolve
    // -----------------------------------------------------------------------

    #[test]
    fn two_and_a_half_hours_rounds_up_to_three() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let submitted = created + Duration::minutes(150);
        assert_eq!(time_to_resolve_hours(created, submitted), 3);
    }

    #[test]
    fn just_under_half_hour_rounds_down() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let submitted = created + Duration::minutes(149);
        assert_eq!(time_to_resolve_hours(created, submitted), 2);
    }

    #[test]
    fn sub_half_hour_resolution_is_zero() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let submitted = created + Duration::minutes(29);
        assert_eq!(time_to_resolve_hours(created, submitted), 0);
    }

    #[test]
    fn negative_skew_clamps_to_zero() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let submitted = created - Duration::minutes(5);
        assert_eq!(time_to_resolve_hours(created, submitted), 0);
    }

    // -----------------------------------------------------------------------
    // First response
    // -----------------------------------------------------------------------

    #[test]
    fn staff_comments_count_as_first_response() {
        assert!(counts_as_first_response("moderator"));
        assert!(counts_as_first_response("admin"));
        assert!(!counts_as_first_response("user"));
    }
}
