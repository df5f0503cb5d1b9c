//! Handler for `solution/rating-reminder`: nudge the creator to rate the
//! solution, unless they already did.

use deskpilot_core::types::DbId;
use deskpilot_db::repositories::{RatingRepo, TicketRepo, UserRepo};
use deskpilot_events::templates::Notification;

use crate::context::PipelineContext;
use crate::step::{run_step, StepError};

pub async fn handle(
    ctx: &PipelineContext,
    ticket_id: DbId,
    solution_id: DbId,
    user_id: DbId,
) -> Result<(), StepError> {
    // Step 1: skip entirely when a rating already exists.
    let already_rated = run_step("check-existing-rating", || async move {
        RatingRepo::exists_for_ticket_user(&ctx.pool, ticket_id, user_id)
            .await
            .map_err(StepError::transient)
    })
    .await?;

    if already_rated {
        tracing::debug!(ticket_id, solution_id, "Solution already rated, skipping reminder");
        return Ok(());
    }

    // Step 2: load the ticket and the creator for the reminder body.
    let (ticket, user) = run_step("fetch-reminder-details", || async move {
        let (ticket, user) = tokio::join!(
            TicketRepo::find_by_id(&ctx.pool, ticket_id),
            UserRepo::find_by_id(&ctx.pool, user_id),
        );
        Ok((
            ticket.map_err(StepError::transient)?,
            user.map_err(StepError::transient)?,
        ))
    })
    .await?;

    // Step 3: send the reminder, best-effort.
    if let (Some(ticket), Some(user)) = (ticket, user) {
        ctx.dispatcher
            .notify_one(
                &user.email,
                Notification::RatingReminder {
                    ticket_title: ticket.title,
                },
            )
            .await;
    }

    Ok(())
}
