//! Notification templates.
//!
//! One variant per notification kind the pipeline dispatches. Each
//! variant carries exactly the data its template renders, so call sites
//! cannot forget a field and the copy lives in one place.

use deskpilot_core::status::{Difficulty, Priority, TicketStatus};
use deskpilot_core::types::DbId;

/// Longest triage-notes excerpt included in an assignment notification.
const EXCERPT_MAX_CHARS: usize = 200;

/// Truncate triage notes for inclusion in a notification body.
pub fn excerpt(notes: &str, max_chars: usize) -> String {
    if notes.chars().count() <= max_chars {
        return notes.to_string();
    }
    let cut: String = notes.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// A renderable notification.
#[derive(Debug, Clone)]
pub enum Notification {
    /// Sent to a moderator when a ticket is assigned to them, either by
    /// triage or by an admin reassignment. `triage_excerpt` is populated
    /// on reassignment, where the new assignee gets the analysis context.
    TicketAssigned {
        ticket_title: String,
        priority: Priority,
        required_skills: Vec<String>,
        triage_excerpt: Option<String>,
    },

    /// Sent to the ticket creator (and the assignee, when someone else
    /// made the change) after an explicit status update.
    TicketStatusChanged {
        ticket_title: String,
        old_status: TicketStatus,
        new_status: TicketStatus,
        updated_by_email: String,
    },

    /// Sent to the previous assignee when a ticket is taken from them.
    TicketReassigned { ticket_title: String },

    /// Sent to the ticket creator when a solution is submitted.
    SolutionReady {
        ticket_title: String,
        moderator_email: String,
        difficulty: Difficulty,
        time_to_resolve_hours: i64,
    },

    /// Thank-you sent to the user who rated a solution.
    SolutionRatedThankYou {
        ticket_title: String,
        rating: i16,
        was_helpful: bool,
        issue_resolved: bool,
        additional_help_needed: bool,
        feedback: String,
    },

    /// Rating detail sent to the moderator who authored the solution.
    SolutionRatedModeratorNotice {
        ticket_title: String,
        rating: i16,
        was_helpful: bool,
        issue_resolved: bool,
        would_recommend: bool,
        clarity: i16,
        helpfulness: i16,
        completeness: i16,
        timeliness: i16,
        feedback: String,
        is_anonymous: bool,
        additional_help_needed: bool,
    },

    /// Escalation fanned out to every admin on a poor outcome.
    LowRatingAdminAlert {
        ticket_id: DbId,
        ticket_title: String,
        moderator_email: String,
        user_email: String,
        rating: i16,
        was_helpful: bool,
        issue_resolved: bool,
        additional_help_needed: bool,
        additional_help_description: String,
    },

    /// Nudge sent to the creator when a solution sits unrated.
    RatingReminder { ticket_title: String },
}

impl Notification {
    /// Stable kind label used in logs and delivery reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TicketAssigned { .. } => "ticket-assigned",
            Self::TicketStatusChanged { .. } => "ticket-status-changed",
            Self::TicketReassigned { .. } => "ticket-reassigned",
            Self::SolutionReady { .. } => "solution-ready",
            Self::SolutionRatedThankYou { .. } => "solution-rated-thankyou",
            Self::SolutionRatedModeratorNotice { .. } => "solution-rated-moderator-notice",
            Self::LowRatingAdminAlert { .. } => "low-rating-admin-alert",
            Self::RatingReminder { .. } => "rating-reminder",
        }
    }

    /// Render the message subject.
    pub fn subject(&self) -> String {
        match self {
            Self::TicketAssigned { ticket_title, .. } => {
                format!("New Ticket Assigned: {ticket_title}")
            }
            Self::TicketStatusChanged { ticket_title, .. } => {
                format!("Ticket Status Update: {ticket_title}")
            }
            Self::TicketReassigned { ticket_title } => {
                format!("Ticket Reassigned: {ticket_title}")
            }
            Self::SolutionReady { ticket_title, .. } => {
                format!("Solution Ready: {ticket_title}")
            }
            Self::SolutionRatedThankYou { .. } => {
                "Thank you for rating our solution!".to_string()
            }
            Self::SolutionRatedModeratorNotice { rating, .. } => {
                format!("Your solution has been rated: {rating}/5 stars")
            }
            Self::LowRatingAdminAlert { ticket_id, rating, .. } => {
                let reason = if *rating <= 2 { "Low Rating" } else { "Additional Help" };
                format!("Action Required: {reason} - Ticket {ticket_id}")
            }
            Self::RatingReminder { ticket_title } => {
                format!("Please rate your solution: {ticket_title}")
            }
        }
    }

    /// Render the plain-text message body.
    pub fn body(&self) -> String {
        match self {
            Self::TicketAssigned {
                ticket_title,
                priority,
                required_skills,
                triage_excerpt,
            } => {
                let skills = if required_skills.is_empty() {
                    "General Support".to_string()
                } else {
                    required_skills.join(", ")
                };
                let mut body = format!(
                    "A support ticket has been assigned to you.\n\n\
                     Title: {ticket_title}\n\
                     Priority: {priority}\n\
                     Skills Required: {skills}\n"
                );
                if let Some(notes) = triage_excerpt {
                    body.push_str(&format!("\nTriage Analysis: {notes}\n"));
                }
                body.push_str("\nPlease log in to the system to view full details.");
                body
            }

            Self::TicketStatusChanged {
                ticket_title,
                old_status,
                new_status,
                updated_by_email,
            } => format!(
                "A ticket you are involved with has been updated.\n\n\
                 Ticket: {ticket_title}\n\
                 Status: {old_status} -> {new_status}\n\
                 Updated by: {updated_by_email}\n\n{}",
                if *new_status == TicketStatus::Resolved {
                    "Your issue has been resolved. If you need further assistance, \
                     please create a new ticket."
                } else {
                    "You can view the full details by logging into your account."
                }
            ),

            Self::TicketReassigned { ticket_title } => format!(
                "A ticket previously assigned to you has been reassigned.\n\n\
                 Ticket: {ticket_title}\n\n\
                 You are no longer responsible for this ticket."
            ),

            Self::SolutionReady {
                ticket_title,
                moderator_email,
                difficulty,
                time_to_resolve_hours,
            } => format!(
                "Good news: a solution has been provided for your support ticket.\n\n\
                 Ticket: {ticket_title}\n\
                 Solved by: {moderator_email}\n\
                 Solution difficulty: {difficulty}\n\
                 Time to resolve: {time_to_resolve_hours} hours\n\n\
                 Your ticket has been marked as resolved. Please log in to view \
                 the complete solution and rate it."
            ),

            Self::SolutionRatedThankYou {
                ticket_title,
                rating,
                was_helpful,
                issue_resolved,
                additional_help_needed,
                feedback,
            } => {
                let mut body = format!(
                    "Thank you for taking the time to rate the solution for your \
                     ticket \"{ticket_title}\".\n\n\
                     Your rating: {rating}/5 stars\n\
                     Was helpful: {}\n\
                     Issue resolved: {}\n",
                    yes_no(*was_helpful),
                    yes_no(*issue_resolved),
                );
                if *additional_help_needed {
                    body.push_str(
                        "\nWe have noted that you need additional help. Our team will \
                         review your request and may reach out to you soon.\n",
                    );
                }
                if !feedback.is_empty() {
                    body.push_str(&format!("\nYour feedback: \"{feedback}\"\n"));
                }
                body.push_str("\nThank you for being a valued user of our support system!");
                body
            }

            Self::SolutionRatedModeratorNotice {
                ticket_title,
                rating,
                was_helpful,
                issue_resolved,
                would_recommend,
                clarity,
                helpfulness,
                completeness,
                timeliness,
                feedback,
                is_anonymous,
                additional_help_needed,
            } => {
                let mut body = format!(
                    "The user has rated your solution for ticket \"{ticket_title}\".\n\n\
                     Rating Details:\n\
                     - Overall Rating: {rating}/5 stars ({})\n\
                     - Was Helpful: {}\n\
                     - Issue Resolved: {}\n\
                     - Would Recommend: {}\n\n\
                     Category Ratings:\n\
                     - Clarity: {clarity}/5\n\
                     - Helpfulness: {helpfulness}/5\n\
                     - Completeness: {completeness}/5\n\
                     - Timeliness: {timeliness}/5\n",
                    rating_text(*rating),
                    yes_no(*was_helpful),
                    yes_no(*issue_resolved),
                    yes_no(*would_recommend),
                );
                if !feedback.is_empty() {
                    let label = if *is_anonymous { "Anonymous Feedback" } else { "User Feedback" };
                    body.push_str(&format!("\n{label}: \"{feedback}\"\n"));
                }
                if *additional_help_needed {
                    body.push_str("\nNote: the user has requested additional help with this issue.\n");
                }
                body.push_str("\nView more details in your moderator dashboard.");
                body
            }

            Self::LowRatingAdminAlert {
                ticket_title,
                moderator_email,
                user_email,
                rating,
                was_helpful,
                issue_resolved,
                additional_help_needed,
                additional_help_description,
                ..
            } => {
                let mut body = format!(
                    "A ticket requires attention.\n\n\
                     Ticket: {ticket_title}\n\
                     Moderator: {moderator_email}\n\
                     User: {user_email}\n\
                     Rating: {rating}/5 stars\n\n\
                     Issues:\n"
                );
                if *rating <= 2 {
                    body.push_str("- Low rating received\n");
                }
                if !*was_helpful {
                    body.push_str("- Solution marked as not helpful\n");
                }
                if !*issue_resolved {
                    body.push_str("- Issue not resolved\n");
                }
                if *additional_help_needed {
                    body.push_str("- User requested additional help\n");
                }
                if !additional_help_description.is_empty() {
                    body.push_str(&format!(
                        "\nAdditional help needed: \"{additional_help_description}\"\n"
                    ));
                }
                body.push_str(
                    "\nPlease review this ticket and consider following up with the \
                     user, providing guidance to the moderator, or escalating.",
                );
                body
            }

            Self::RatingReminder { ticket_title } => format!(
                "We hope the solution provided for your ticket \"{ticket_title}\" \
                 was helpful!\n\n\
                 Your feedback is valuable and helps us improve our service \
                 quality. Please log in to your account to rate the solution \
                 (1-5 stars), tell us whether it was clear and helpful, and let \
                 us know if your issue was fully resolved.\n\n\
                 Thank you for helping us improve!"
            ),
        }
    }
}

/// Build the default-length triage excerpt for assignment notifications.
pub fn triage_excerpt(notes: &str) -> Option<String> {
    let notes = notes.trim();
    if notes.is_empty() {
        None
    } else {
        Some(excerpt(notes, EXCERPT_MAX_CHARS))
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn rating_text(rating: i16) -> &'static str {
    match rating {
        1 => "Very Poor",
        2 => "Poor",
        3 => "Fair",
        4 => "Good",
        _ => "Excellent",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_passes_short_text_through() {
        assert_eq!(excerpt("short note", 200), "short note");
    }

    #[test]
    fn excerpt_truncates_long_text_with_ellipsis() {
        let long = "x".repeat(250);
        let result = excerpt(&long, 200);
        assert_eq!(result.chars().count(), 203);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn triage_excerpt_skips_empty_notes() {
        assert!(triage_excerpt("   ").is_none());
        assert_eq!(triage_excerpt("check DNS"), Some("check DNS".to_string()));
    }

    #[test]
    fn assigned_body_includes_skills_and_excerpt() {
        let n = Notification::TicketAssigned {
            ticket_title: "App crashes".to_string(),
            priority: Priority::High,
            required_skills: vec!["Rust".to_string(), "Linux".to_string()],
            triage_excerpt: Some("Likely a null pointer".to_string()),
        };
        let body = n.body();
        assert!(body.contains("Rust, Linux"));
        assert!(body.contains("Likely a null pointer"));
        assert_eq!(n.kind(), "ticket-assigned");
    }

    #[test]
    fn low_rating_alert_lists_each_issue() {
        let n = Notification::LowRatingAdminAlert {
            ticket_id: 9,
            ticket_title: "Printer on fire".to_string(),
            moderator_email: "mod@example.com".to_string(),
            user_email: "user@example.com".to_string(),
            rating: 1,
            was_helpful: false,
            issue_resolved: false,
            additional_help_needed: true,
            additional_help_description: "still burning".to_string(),
        };
        let body = n.body();
        assert!(body.contains("- Low rating received"));
        assert!(body.contains("- Solution marked as not helpful"));
        assert!(body.contains("- Issue not resolved"));
        assert!(body.contains("- User requested additional help"));
        assert!(body.contains("still burning"));
        assert!(n.subject().contains("Low Rating"));
    }

    #[test]
    fn alert_subject_for_help_request_without_low_rating() {
        let n = Notification::LowRatingAdminAlert {
            ticket_id: 9,
            ticket_title: "t".to_string(),
            moderator_email: String::new(),
            user_email: String::new(),
            rating: 4,
            was_helpful: true,
            issue_resolved: true,
            additional_help_needed: true,
            additional_help_description: String::new(),
        };
        assert!(n.subject().contains("Additional Help"));
    }

    #[test]
    fn resolved_status_change_mentions_resolution() {
        let n = Notification::TicketStatusChanged {
            ticket_title: "t".to_string(),
            old_status: TicketStatus::InProgress,
            new_status: TicketStatus::Resolved,
            updated_by_email: "mod@example.com".to_string(),
        };
        assert!(n.body().contains("has been resolved"));
    }
}
