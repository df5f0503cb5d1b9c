//! Handler for `solution/submitted`: notify the creator, emit metrics,
//! schedule the rating reminder.

use deskpilot_core::types::DbId;
use deskpilot_db::repositories::{SolutionRepo, TicketRepo, UserRepo};
use deskpilot_events::templates::Notification;
use deskpilot_events::TicketEvent;

use crate::analytics;
use crate::context::PipelineContext;
use crate::step::{run_step, StepError};

pub async fn handle(
    ctx: &PipelineContext,
    solution_id: DbId,
    ticket_id: DbId,
    moderator_id: DbId,
    user_id: DbId,
) -> Result<(), StepError> {
    // Step 1: load the solution and its related entities in parallel.
    // Only a missing solution aborts; the others degrade the notification.
    let (solution, ticket, user, moderator) = run_step("fetch-solution-data", || async move {
        let (solution, ticket, user, moderator) = tokio::join!(
            SolutionRepo::find_by_id(&ctx.pool, solution_id),
            TicketRepo::find_by_id(&ctx.pool, ticket_id),
            UserRepo::find_by_id(&ctx.pool, user_id),
            UserRepo::find_by_id(&ctx.pool, moderator_id),
        );
        let solution = solution
            .map_err(StepError::transient)?
            .ok_or_else(|| StepError::non_retriable(format!("solution {solution_id} not found")))?;
        Ok((
            solution,
            ticket.map_err(StepError::transient)?,
            user.map_err(StepError::transient)?,
            moderator.map_err(StepError::transient)?,
        ))
    })
    .await?;

    // Step 2: tell the creator their solution is ready, best-effort.
    if let (Some(ticket), Some(user)) = (&ticket, &user) {
        let moderator_email = moderator
            .as_ref()
            .map(|m| m.email.clone())
            .unwrap_or_else(|| "the support team".to_string());
        ctx.dispatcher
            .notify_one(
                &user.email,
                Notification::SolutionReady {
                    ticket_title: ticket.title.clone(),
                    moderator_email,
                    difficulty: solution.difficulty,
                    time_to_resolve_hours: solution.time_to_resolve_hours,
                },
            )
            .await;
    }

    // Step 3: metrics, observability only.
    analytics::solution_metrics(
        &solution,
        moderator.as_ref().map(|m| m.email.as_str()).unwrap_or("unknown"),
    );

    // Schedule the one-shot rating reminder back through the bus.
    let bus = ctx.bus.clone();
    let delay = ctx.rating_reminder_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        bus.publish(TicketEvent::RatingReminderDue {
            ticket_id,
            solution_id,
            user_id,
        });
    });
    tracing::debug!(
        ticket_id,
        solution_id,
        delay_secs = delay.as_secs(),
        "Rating reminder scheduled"
    );

    Ok(())
}
