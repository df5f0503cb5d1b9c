//! Handler for `ticket/status-updated`: notify the creator and the
//! assignee (unless the assignee made the change), emit metrics.

use deskpilot_core::status::TicketStatus;
use deskpilot_core::types::DbId;
use deskpilot_db::repositories::{TicketRepo, UserRepo};
use deskpilot_events::templates::Notification;

use crate::analytics;
use crate::context::PipelineContext;
use crate::handlers::fetch_optional_user;
use crate::step::{run_step, StepError};

pub async fn handle(
    ctx: &PipelineContext,
    ticket_id: DbId,
    old_status: TicketStatus,
    new_status: TicketStatus,
    updated_by: DbId,
) -> Result<(), StepError> {
    // Step 1: load the ticket and everyone involved; only a missing
    // ticket aborts the event.
    let (ticket, updater) = run_step("fetch-ticket-details", || async move {
        let (ticket, updater) = tokio::join!(
            TicketRepo::find_by_id(&ctx.pool, ticket_id),
            UserRepo::find_by_id(&ctx.pool, updated_by),
        );
        let ticket = ticket
            .map_err(StepError::transient)?
            .ok_or_else(|| StepError::non_retriable(format!("ticket {ticket_id} not found")))?;
        Ok((ticket, updater.map_err(StepError::transient)?))
    })
    .await?;

    let created_by = ticket.created_by;
    let assigned_to = ticket.assigned_to;
    let (creator, assignee) = run_step("fetch-participants", || async move {
        let creator = UserRepo::find_by_id(&ctx.pool, created_by)
            .await
            .map_err(StepError::transient)?;
        let assignee = fetch_optional_user(&ctx.pool, assigned_to)
            .await
            .map_err(StepError::transient)?;
        Ok((creator, assignee))
    })
    .await?;

    let updated_by_email = updater
        .map(|u| u.email)
        .unwrap_or_else(|| "unknown".to_string());

    let make_notification = || Notification::TicketStatusChanged {
        ticket_title: ticket.title.clone(),
        old_status,
        new_status,
        updated_by_email: updated_by_email.clone(),
    };

    // Step 2: notify the creator, best-effort.
    if let Some(creator) = &creator {
        ctx.dispatcher
            .notify_one(&creator.email, make_notification())
            .await;
    }

    // Step 3: notify the assignee, unless they made the change themselves.
    if let Some(assignee) = assignee.filter(|a| a.id != updated_by) {
        ctx.dispatcher
            .notify_one(&assignee.email, make_notification())
            .await;
    }

    // Step 4: analytics, observability only.
    analytics::status_change_metrics(ticket_id, old_status, new_status, updated_by);

    Ok(())
}
