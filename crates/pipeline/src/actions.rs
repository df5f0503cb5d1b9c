//! Intake operations: the event-producing actions users, moderators, and
//! admins perform.
//!
//! Each action validates its input, enforces the domain conflicts
//! (uniqueness, assignment, role), persists, and publishes the
//! corresponding event. An action succeeds as soon as the core record is
//! persisted; triage, matching, and notifications run as decoupled
//! follow-up work on the pipeline.

use chrono::Utc;
use validator::Validate;

use deskpilot_core::lifecycle;
use deskpilot_core::roles::{ROLE_ADMIN, ROLE_USER};
use deskpilot_core::status::{Priority, TicketStatus};
use deskpilot_core::types::DbId;
use deskpilot_core::CoreError;
use deskpilot_db::models::rating::{CreateRating, Rating};
use deskpilot_db::models::solution::{CreateSolution, Solution};
use deskpilot_db::models::ticket::{CreateComment, CreateTicket, Ticket, TicketComment};
use deskpilot_db::models::user::User;
use deskpilot_db::repositories::{RatingRepo, SolutionRepo, TicketRepo, UserRepo};
use deskpilot_db::DbPool;
use deskpilot_events::{EventBus, TicketEvent};

/// Create a ticket and kick off the processing pipeline.
pub async fn create_ticket(
    pool: &DbPool,
    bus: &EventBus,
    input: CreateTicket,
) -> Result<Ticket, CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let ticket = TicketRepo::create(pool, &input).await.map_err(db_error)?;
    tracing::info!(ticket_id = ticket.id, created_by = ticket.created_by, "Ticket created");

    bus.publish(TicketEvent::TicketCreated { ticket_id: ticket.id });
    Ok(ticket)
}

/// Submit the solution for a ticket.
///
/// Valid only when the ticket is assigned to the acting moderator and not
/// already resolved; at most one solution can ever exist per ticket.
pub async fn submit_solution(
    pool: &DbPool,
    bus: &EventBus,
    moderator: &User,
    input: CreateSolution,
) -> Result<Solution, CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let ticket = TicketRepo::find_by_id(pool, input.ticket_id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", input.ticket_id))?;

    if ticket.assigned_to != Some(moderator.id) {
        return Err(CoreError::Forbidden(
            "you are not assigned to this ticket".to_string(),
        ));
    }
    if ticket.status == TicketStatus::Resolved {
        return Err(CoreError::Conflict(format!(
            "ticket {} is already resolved",
            ticket.id
        )));
    }

    let time_to_resolve_hours = lifecycle::time_to_resolve_hours(ticket.created_at, Utc::now());

    let solution = SolutionRepo::create(pool, &input, moderator.id, time_to_resolve_hours)
        .await
        .map_err(|e| conflict_on_unique(e, "a solution already exists for this ticket"))?;

    // Set-once link plus the transition to RESOLVED, in one conditional
    // write. `false` means another solution won the race for this ticket.
    let linked = TicketRepo::link_solution(pool, ticket.id, solution.id, moderator.id)
        .await
        .map_err(db_error)?;
    if !linked {
        tracing::warn!(
            ticket_id = ticket.id,
            solution_id = solution.id,
            "Ticket already linked to a solution"
        );
    }

    tracing::info!(
        ticket_id = ticket.id,
        solution_id = solution.id,
        moderator_id = moderator.id,
        time_to_resolve_hours,
        "Solution submitted"
    );

    bus.publish(TicketEvent::SolutionSubmitted {
        solution_id: solution.id,
        ticket_id: ticket.id,
        moderator_id: moderator.id,
        user_id: ticket.created_by,
        time_to_resolve_hours,
    });
    Ok(solution)
}

/// Rate the solution of one's own ticket.
///
/// One rating per (ticket, user); the solution's effectiveness is derived
/// here, exactly once per rating.
pub async fn rate_solution(
    pool: &DbPool,
    bus: &EventBus,
    user: &User,
    input: CreateRating,
) -> Result<Rating, CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    if user.role != ROLE_USER {
        return Err(CoreError::Forbidden(
            "only users can rate solutions".to_string(),
        ));
    }

    let solution = SolutionRepo::find_by_ticket(pool, input.ticket_id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("solution for ticket", input.ticket_id))?;

    let ticket = TicketRepo::find_by_id(pool, input.ticket_id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", input.ticket_id))?;

    if ticket.created_by != user.id {
        return Err(CoreError::Forbidden(
            "you can only rate solutions for your own tickets".to_string(),
        ));
    }

    let rating = RatingRepo::create(pool, &input, solution.id, user.id, solution.moderator_id)
        .await
        .map_err(|e| conflict_on_unique(e, "you have already rated this solution"))?;

    let effectiveness = lifecycle::derive_effectiveness(
        rating.rating,
        rating.was_helpful,
        rating.issue_resolved,
    );
    SolutionRepo::set_effectiveness(pool, solution.id, effectiveness, &rating.feedback)
        .await
        .map_err(db_error)?;

    tracing::info!(
        ticket_id = ticket.id,
        rating_id = rating.id,
        rating = rating.rating,
        effectiveness = %effectiveness,
        "Solution rated"
    );

    bus.publish(TicketEvent::SolutionRated {
        rating_id: rating.id,
        solution_id: solution.id,
        ticket_id: ticket.id,
        moderator_id: solution.moderator_id,
        user_id: user.id,
        rating: rating.rating,
        was_helpful: rating.was_helpful,
        issue_resolved: rating.issue_resolved,
    });
    Ok(rating)
}

/// Explicitly set a ticket's status (moderator/admin only).
///
/// Any target status is accepted; transitions outside the normal flow are
/// logged as overrides, including the escape hatch of resolving a ticket
/// that has no solution. Reopening never resets the historical
/// timestamps.
pub async fn update_status(
    pool: &DbPool,
    bus: &EventBus,
    actor: &User,
    ticket_id: DbId,
    new_status: TicketStatus,
) -> Result<Ticket, CoreError> {
    if actor.role == ROLE_USER {
        return Err(CoreError::Forbidden(
            "insufficient permissions to update ticket status".to_string(),
        ));
    }

    let ticket = TicketRepo::find_by_id(pool, ticket_id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", ticket_id))?;
    let old_status = ticket.status;

    if lifecycle::requires_override(old_status, new_status) {
        tracing::warn!(
            ticket_id,
            old_status = %old_status,
            new_status = %new_status,
            actor_id = actor.id,
            "Status override outside the normal flow"
        );
    }
    if new_status == TicketStatus::Resolved && ticket.solution_id.is_none() {
        tracing::warn!(ticket_id, actor_id = actor.id, "Ticket resolved without a solution");
    }

    let updated = TicketRepo::set_status(pool, ticket_id, new_status, Some(actor.id))
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", ticket_id))?;

    bus.publish(TicketEvent::TicketStatusUpdated {
        ticket_id,
        old_status,
        new_status,
        updated_by: actor.id,
    });
    Ok(updated)
}

/// Override a ticket's priority (moderator/admin only). No follow-up
/// event; priority changes are silent bookkeeping.
pub async fn update_priority(
    pool: &DbPool,
    actor: &User,
    ticket_id: DbId,
    priority: Priority,
) -> Result<Ticket, CoreError> {
    if actor.role == ROLE_USER {
        return Err(CoreError::Forbidden(
            "insufficient permissions to update ticket priority".to_string(),
        ));
    }

    TicketRepo::set_priority(pool, ticket_id, priority, actor.id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", ticket_id))
}

/// Move a ticket to a different assignee, or unassign it (admin only).
pub async fn reassign(
    pool: &DbPool,
    bus: &EventBus,
    actor: &User,
    ticket_id: DbId,
    new_assignee: Option<DbId>,
) -> Result<Ticket, CoreError> {
    if actor.role != ROLE_ADMIN {
        return Err(CoreError::Forbidden(
            "only admins can reassign tickets".to_string(),
        ));
    }

    if let Some(assignee_id) = new_assignee {
        UserRepo::find_by_id(pool, assignee_id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::not_found("user", assignee_id))?;
    }

    let ticket = TicketRepo::find_by_id(pool, ticket_id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", ticket_id))?;
    let old_assignee = ticket.assigned_to;

    let updated = TicketRepo::reassign(pool, ticket_id, new_assignee, actor.id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", ticket_id))?;

    bus.publish(TicketEvent::TicketReassigned {
        ticket_id,
        old_assignee,
        new_assignee,
        reassigned_by: actor.id,
    });
    Ok(updated)
}

/// Append a comment to a ticket. A staff comment stamps the ticket's
/// `first_response_at`, once.
pub async fn add_comment(
    pool: &DbPool,
    actor: &User,
    ticket_id: DbId,
    input: CreateComment,
) -> Result<TicketComment, CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    TicketRepo::find_by_id(pool, ticket_id)
        .await
        .map_err(db_error)?
        .ok_or(CoreError::not_found("ticket", ticket_id))?;

    let comment = TicketRepo::add_comment(pool, ticket_id, actor.id, &input)
        .await
        .map_err(db_error)?;

    if lifecycle::counts_as_first_response(&actor.role) {
        TicketRepo::touch_first_response(pool, ticket_id)
            .await
            .map_err(db_error)?;
    }

    Ok(comment)
}

fn db_error(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("database error: {e}"))
}

fn conflict_on_unique(e: sqlx::Error, message: &str) -> CoreError {
    if deskpilot_db::unique_violation(&e).is_some() {
        CoreError::Conflict(message.to_string())
    } else {
        db_error(e)
    }
}
