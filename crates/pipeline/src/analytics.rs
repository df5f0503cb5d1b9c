//! Structured metric emission.
//!
//! Observability only: these never fail the pipeline. Each function emits
//! one `tracing` event with structured fields under the
//! `deskpilot::analytics` target so operators can filter them out or
//! route them to a metrics sink.

use deskpilot_core::status::TicketStatus;
use deskpilot_core::types::DbId;
use deskpilot_db::models::rating::Rating;
use deskpilot_db::models::solution::Solution;

/// Emitted after a solution-submitted event is processed.
pub fn solution_metrics(solution: &Solution, moderator_email: &str) {
    tracing::info!(
        target: "deskpilot::analytics",
        solution_id = solution.id,
        ticket_id = solution.ticket_id,
        moderator = moderator_email,
        time_to_resolve_hours = solution.time_to_resolve_hours,
        difficulty = %solution.difficulty,
        steps_provided = solution.steps.0.len(),
        resources_provided = solution.resources.0.len(),
        "Solution metrics"
    );
}

/// Emitted after a solution-rated event is processed.
pub fn rating_metrics(rating: &Rating, follow_up_required: bool) {
    tracing::info!(
        target: "deskpilot::analytics",
        rating_id = rating.id,
        solution_id = rating.solution_id,
        ticket_id = rating.ticket_id,
        rating = rating.rating,
        was_helpful = rating.was_helpful,
        issue_resolved = rating.issue_resolved,
        would_recommend = rating.would_recommend,
        category_average = rating.category_average(),
        additional_help_needed = rating.additional_help_needed,
        follow_up_required,
        "Rating metrics"
    );
}

/// Emitted after a status-updated event is processed.
pub fn status_change_metrics(
    ticket_id: DbId,
    old_status: TicketStatus,
    new_status: TicketStatus,
    updated_by: DbId,
) {
    tracing::info!(
        target: "deskpilot::analytics",
        ticket_id,
        old_status = %old_status,
        new_status = %new_status,
        updated_by,
        "Status change metrics"
    );
}
