//! Event handlers, one module per event kind.
//!
//! Each handler is a fixed, ordered sequence of steps run through the
//! [`step`](crate::step) runtime. Steps within one event execute strictly
//! in sequence; events for different tickets run concurrently on separate
//! tasks with no cross-event ordering.

use deskpilot_core::types::DbId;
use deskpilot_db::models::user::User;
use deskpilot_db::repositories::UserRepo;
use deskpilot_db::DbPool;
use deskpilot_events::TicketEvent;

use crate::context::PipelineContext;

pub mod rating_reminder;
pub mod solution_rated;
pub mod solution_submitted;
pub mod status_updated;
pub mod ticket_created;
pub mod ticket_reassigned;

/// Route one event to its handler and log the outcome.
///
/// Handler failures are terminal for the event (the step runtime already
/// retried what was retriable); they never propagate to the orchestrator.
pub async fn handle_event(ctx: &PipelineContext, event: TicketEvent) {
    let name = event.name();
    let ticket_id = event.ticket_id();
    tracing::info!(event = name, ticket_id, "Processing event");

    let result = match event {
        TicketEvent::TicketCreated { ticket_id } => ticket_created::handle(ctx, ticket_id).await,

        TicketEvent::SolutionSubmitted {
            solution_id,
            ticket_id,
            moderator_id,
            user_id,
            time_to_resolve_hours: _,
        } => solution_submitted::handle(ctx, solution_id, ticket_id, moderator_id, user_id).await,

        TicketEvent::SolutionRated {
            rating_id,
            solution_id: _,
            ticket_id,
            moderator_id,
            user_id,
            rating,
            was_helpful,
            issue_resolved,
        } => {
            solution_rated::handle(
                ctx,
                rating_id,
                ticket_id,
                moderator_id,
                user_id,
                rating,
                was_helpful,
                issue_resolved,
            )
            .await
        }

        TicketEvent::TicketStatusUpdated {
            ticket_id,
            old_status,
            new_status,
            updated_by,
        } => status_updated::handle(ctx, ticket_id, old_status, new_status, updated_by).await,

        TicketEvent::TicketReassigned {
            ticket_id,
            old_assignee,
            new_assignee,
            reassigned_by: _,
        } => ticket_reassigned::handle(ctx, ticket_id, old_assignee, new_assignee).await,

        TicketEvent::RatingReminderDue {
            ticket_id,
            solution_id,
            user_id,
        } => rating_reminder::handle(ctx, ticket_id, solution_id, user_id).await,
    };

    match result {
        Ok(()) => tracing::info!(event = name, ticket_id, "Event processed"),
        Err(e) => {
            tracing::error!(event = name, ticket_id, error = %e, "Event processing aborted")
        }
    }
}

/// Load a user when an optional reference is present.
pub(crate) async fn fetch_optional_user(
    pool: &DbPool,
    id: Option<DbId>,
) -> Result<Option<User>, sqlx::Error> {
    match id {
        Some(id) => UserRepo::find_by_id(pool, id).await,
        None => Ok(None),
    }
}
