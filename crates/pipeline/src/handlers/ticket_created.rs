//! Handler for `ticket/created`: triage, assignment, notification.

use deskpilot_core::status::TicketStatus;
use deskpilot_core::types::DbId;
use deskpilot_db::repositories::TicketRepo;
use deskpilot_events::templates::Notification;

use crate::context::PipelineContext;
use crate::matcher::ModeratorMatcher;
use crate::step::{run_step, StepError};

pub async fn handle(ctx: &PipelineContext, ticket_id: DbId) -> Result<(), StepError> {
    // Step 1: load the ticket; a missing ticket aborts the event.
    let ticket = run_step("fetch-ticket", || async move {
        TicketRepo::find_by_id(&ctx.pool, ticket_id)
            .await
            .map_err(StepError::transient)?
            .ok_or_else(|| StepError::non_retriable(format!("ticket {ticket_id} not found")))
    })
    .await?;

    // Step 2: intake marker. The OPEN -> OPEN write is a deliberate no-op;
    // the move to IN_PROGRESS waits for triage below.
    run_step("mark-intake", || async move {
        let _ = TicketRepo::set_status(&ctx.pool, ticket_id, TicketStatus::Open, None)
            .await
            .map_err(StepError::transient)?;
        Ok(())
    })
    .await?;

    // Classification runs outside the retryable-step boundary: the adapter
    // resolves every failure mode to its fallback internally.
    let ticket_text = format!("Title: {}\nDescription: {}", ticket.title, ticket.description);
    let triage = ctx.triage.classify(&ticket_text).await;
    tracing::info!(
        ticket_id,
        priority = %triage.priority,
        skills = ?triage.skills,
        "Triage complete"
    );

    // Step 4: persist triage output and move the ticket to IN_PROGRESS.
    let triage_ref = &triage;
    let ticket = run_step("apply-triage", || async move {
        TicketRepo::apply_triage(
            &ctx.pool,
            ticket_id,
            triage_ref.priority,
            &triage_ref.notes,
            &triage_ref.skills,
        )
        .await
        .map_err(StepError::transient)?
        .ok_or_else(|| StepError::non_retriable(format!("ticket {ticket_id} not found")))
    })
    .await?;

    // Step 5: select a moderator for the resolved skills.
    let required = &ticket.required_skills;
    let moderator = run_step("assign-moderator", || async move {
        ModeratorMatcher::find(&ctx.pool, required)
            .await
            .map_err(StepError::transient)
    })
    .await?;

    let Some(moderator) = moderator else {
        // An unassigned ticket is a valid outcome, not a failure.
        tracing::warn!(ticket_id, "No moderator or admin available, ticket left unassigned");
        return Ok(());
    };

    // Step 6: persist the assignment.
    let moderator_id = moderator.id;
    run_step("persist-assignment", || async move {
        let _ = TicketRepo::assign(&ctx.pool, ticket_id, moderator_id)
            .await
            .map_err(StepError::transient)?;
        Ok(())
    })
    .await?;
    tracing::info!(ticket_id, moderator_id, "Ticket assigned");

    // Step 7: assignment notification, best-effort.
    ctx.dispatcher
        .notify_one(
            &moderator.email,
            Notification::TicketAssigned {
                ticket_title: ticket.title.clone(),
                priority: ticket.priority,
                required_skills: ticket.required_skills.clone(),
                triage_excerpt: None,
            },
        )
        .await;

    Ok(())
}
