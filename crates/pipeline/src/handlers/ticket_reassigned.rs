//! Handler for `ticket/reassigned`: tell the previous assignee they are
//! off the ticket and hand the new assignee the triage context.

use deskpilot_core::types::DbId;
use deskpilot_db::repositories::TicketRepo;
use deskpilot_events::templates::{self, Notification};

use crate::context::PipelineContext;
use crate::handlers::fetch_optional_user;
use crate::step::{run_step, StepError};

pub async fn handle(
    ctx: &PipelineContext,
    ticket_id: DbId,
    old_assignee: Option<DbId>,
    new_assignee: Option<DbId>,
) -> Result<(), StepError> {
    // Step 1: load the ticket and both assignees in parallel.
    let (ticket, old_user, new_user) = run_step("fetch-reassignment-details", || async move {
        let (ticket, old_user, new_user) = tokio::join!(
            TicketRepo::find_by_id(&ctx.pool, ticket_id),
            fetch_optional_user(&ctx.pool, old_assignee),
            fetch_optional_user(&ctx.pool, new_assignee),
        );
        let ticket = ticket
            .map_err(StepError::transient)?
            .ok_or_else(|| StepError::non_retriable(format!("ticket {ticket_id} not found")))?;
        Ok((
            ticket,
            old_user.map_err(StepError::transient)?,
            new_user.map_err(StepError::transient)?,
        ))
    })
    .await?;

    // Step 2: the previous assignee is no longer responsible, best-effort.
    if let Some(old_user) = &old_user {
        ctx.dispatcher
            .notify_one(
                &old_user.email,
                Notification::TicketReassigned {
                    ticket_title: ticket.title.clone(),
                },
            )
            .await;
    }

    // Step 3: the new assignee gets the ticket context with a truncated
    // excerpt of the triage notes, best-effort.
    if let Some(new_user) = &new_user {
        ctx.dispatcher
            .notify_one(
                &new_user.email,
                Notification::TicketAssigned {
                    ticket_title: ticket.title.clone(),
                    priority: ticket.priority,
                    required_skills: ticket.required_skills.clone(),
                    triage_excerpt: templates::triage_excerpt(&ticket.triage_notes),
                },
            )
            .await;
    }

    Ok(())
}
