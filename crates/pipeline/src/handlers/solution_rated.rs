//! Handler for `solution/rated`: ticket satisfaction bookkeeping,
//! thank-you and moderator notices, admin escalation on poor outcomes.

use deskpilot_core::lifecycle;
use deskpilot_core::roles::ROLE_ADMIN;
use deskpilot_core::types::DbId;
use deskpilot_db::repositories::{RatingRepo, TicketRepo, UserRepo};
use deskpilot_events::templates::Notification;
use deskpilot_events::Recipient;

use crate::analytics;
use crate::context::PipelineContext;
use crate::step::{run_step, StepError};

/// Whether a rating outcome warrants the admin alert fan-out.
pub fn should_alert_admins(
    rating: i16,
    was_helpful: bool,
    issue_resolved: bool,
    additional_help_needed: bool,
) -> bool {
    rating <= 2 || !was_helpful || !issue_resolved || additional_help_needed
}

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    ctx: &PipelineContext,
    rating_id: DbId,
    ticket_id: DbId,
    moderator_id: DbId,
    user_id: DbId,
    rating: i16,
    was_helpful: bool,
    issue_resolved: bool,
) -> Result<(), StepError> {
    // Step 1: load the rating and its related entities in parallel. Only
    // a missing rating aborts; the others degrade the notifications.
    let (rating_doc, ticket, user, moderator) = run_step("fetch-rating-data", || async move {
        let (rating_doc, ticket, user, moderator) = tokio::join!(
            RatingRepo::find_by_id(&ctx.pool, rating_id),
            TicketRepo::find_by_id(&ctx.pool, ticket_id),
            UserRepo::find_by_id(&ctx.pool, user_id),
            UserRepo::find_by_id(&ctx.pool, moderator_id),
        );
        let rating_doc = rating_doc
            .map_err(StepError::transient)?
            .ok_or_else(|| StepError::non_retriable(format!("rating {rating_id} not found")))?;
        Ok((
            rating_doc,
            ticket.map_err(StepError::transient)?,
            user.map_err(StepError::transient)?,
            moderator.map_err(StepError::transient)?,
        ))
    })
    .await?;

    // Step 2: record the satisfaction outcome on the ticket.
    let follow_up =
        lifecycle::needs_follow_up(issue_resolved, rating_doc.additional_help_needed);
    run_step("update-ticket-rating", || async move {
        let _ = TicketRepo::record_rating(&ctx.pool, ticket_id, rating, rating_id, follow_up)
            .await
            .map_err(StepError::transient)?;
        Ok(())
    })
    .await?;

    let ticket_title = ticket
        .as_ref()
        .map(|t| t.title.clone())
        .unwrap_or_else(|| format!("ticket {ticket_id}"));

    // Step 3: thank the rater and inform the moderator, each best-effort
    // and independently failing.
    let mut recipients = Vec::new();
    if let Some(user) = &user {
        recipients.push(Recipient::new(
            &user.email,
            Notification::SolutionRatedThankYou {
                ticket_title: ticket_title.clone(),
                rating,
                was_helpful,
                issue_resolved,
                additional_help_needed: rating_doc.additional_help_needed,
                feedback: rating_doc.feedback.clone(),
            },
        ));
    }
    if let Some(moderator) = &moderator {
        recipients.push(Recipient::new(
            &moderator.email,
            Notification::SolutionRatedModeratorNotice {
                ticket_title: ticket_title.clone(),
                rating,
                was_helpful,
                issue_resolved,
                would_recommend: rating_doc.would_recommend,
                clarity: rating_doc.clarity,
                helpfulness: rating_doc.helpfulness,
                completeness: rating_doc.completeness,
                timeliness: rating_doc.timeliness,
                feedback: rating_doc.feedback.clone(),
                is_anonymous: rating_doc.is_anonymous,
                additional_help_needed: rating_doc.additional_help_needed,
            },
        ));
    }
    ctx.dispatcher.notify(recipients).await;

    // Step 4: fan an alert out to every admin on a poor outcome; each
    // recipient succeeds or fails independently of the others.
    if should_alert_admins(
        rating,
        was_helpful,
        issue_resolved,
        rating_doc.additional_help_needed,
    ) {
        let admins = run_step("load-admins", || async move {
            UserRepo::list_active_by_role(&ctx.pool, ROLE_ADMIN)
                .await
                .map_err(StepError::transient)
        })
        .await?;

        let moderator_email = moderator
            .as_ref()
            .map(|m| m.email.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let user_email = user
            .as_ref()
            .map(|u| u.email.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let alerts: Vec<Recipient> = admins
            .iter()
            .map(|admin| {
                Recipient::new(
                    &admin.email,
                    Notification::LowRatingAdminAlert {
                        ticket_id,
                        ticket_title: ticket_title.clone(),
                        moderator_email: moderator_email.clone(),
                        user_email: user_email.clone(),
                        rating,
                        was_helpful,
                        issue_resolved,
                        additional_help_needed: rating_doc.additional_help_needed,
                        additional_help_description: rating_doc
                            .additional_help_description
                            .clone(),
                    },
                )
            })
            .collect();

        let report = ctx.dispatcher.notify(alerts).await;
        tracing::warn!(
            ticket_id,
            rating,
            admins_alerted = report.delivered(),
            "Ticket flagged for review"
        );
    }

    // Step 5: analytics, observability only.
    analytics::rating_metrics(&rating_doc, follow_up);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::should_alert_admins;

    #[test]
    fn low_rating_alerts() {
        assert!(should_alert_admins(2, true, true, false));
        assert!(should_alert_admins(1, true, true, false));
    }

    #[test]
    fn unhelpful_or_unresolved_alerts() {
        assert!(should_alert_admins(5, false, true, false));
        assert!(should_alert_admins(5, true, false, false));
    }

    #[test]
    fn help_request_alerts() {
        assert!(should_alert_admins(5, true, true, true));
    }

    #[test]
    fn good_outcome_does_not_alert() {
        assert!(!should_alert_admins(4, true, true, false));
        assert!(!should_alert_admins(3, true, true, false));
    }
}
