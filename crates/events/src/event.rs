//! Domain events and their boundary validation.
//!
//! Each event kind is a distinct variant with a fixed field set. The
//! ingress boundary ([`TicketEvent::from_payload`]) validates a flat
//! key/value payload strictly: unrecognized event names, missing fields,
//! wrong types, and unexpected extra fields are all rejected rather than
//! trusted.

use deskpilot_core::status::TicketStatus;
use deskpilot_core::types::DbId;
use serde_json::{Map, Value};

/// Event name for ticket creation.
pub const TICKET_CREATED: &str = "ticket/created";
/// Event name for solution submission.
pub const SOLUTION_SUBMITTED: &str = "solution/submitted";
/// Event name for solution rating.
pub const SOLUTION_RATED: &str = "solution/rated";
/// Event name for an explicit status update.
pub const TICKET_STATUS_UPDATED: &str = "ticket/status-updated";
/// Event name for reassignment.
pub const TICKET_REASSIGNED: &str = "ticket/reassigned";
/// Event name for the delayed rating reminder.
pub const RATING_REMINDER_DUE: &str = "solution/rating-reminder";

/// A domain event processed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketEvent {
    /// A user filed a new ticket; triage and assignment should run.
    TicketCreated { ticket_id: DbId },

    /// A moderator submitted the solution for a ticket.
    SolutionSubmitted {
        solution_id: DbId,
        ticket_id: DbId,
        moderator_id: DbId,
        user_id: DbId,
        time_to_resolve_hours: i64,
    },

    /// The ticket creator rated the solution.
    SolutionRated {
        rating_id: DbId,
        solution_id: DbId,
        ticket_id: DbId,
        moderator_id: DbId,
        user_id: DbId,
        rating: i16,
        was_helpful: bool,
        issue_resolved: bool,
    },

    /// A moderator or admin explicitly set the ticket status.
    TicketStatusUpdated {
        ticket_id: DbId,
        old_status: TicketStatus,
        new_status: TicketStatus,
        updated_by: DbId,
    },

    /// An admin moved the ticket to a different assignee (or unassigned it).
    TicketReassigned {
        ticket_id: DbId,
        old_assignee: Option<DbId>,
        new_assignee: Option<DbId>,
        reassigned_by: DbId,
    },

    /// The post-solution reminder window elapsed without a rating check.
    RatingReminderDue {
        ticket_id: DbId,
        solution_id: DbId,
        user_id: DbId,
    },
}

/// Error type for payload validation at the event ingress boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    #[error("Event payload must be a JSON object")]
    NotAnObject,

    #[error("Missing field {field} in {event} payload")]
    MissingField { event: &'static str, field: &'static str },

    #[error("Field {field} is not a valid {expected}")]
    InvalidField { field: &'static str, expected: &'static str },

    #[error("Unexpected field {0} in event payload")]
    UnexpectedField(String),
}

impl TicketEvent {
    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TicketCreated { .. } => TICKET_CREATED,
            Self::SolutionSubmitted { .. } => SOLUTION_SUBMITTED,
            Self::SolutionRated { .. } => SOLUTION_RATED,
            Self::TicketStatusUpdated { .. } => TICKET_STATUS_UPDATED,
            Self::TicketReassigned { .. } => TICKET_REASSIGNED,
            Self::RatingReminderDue { .. } => RATING_REMINDER_DUE,
        }
    }

    /// The id of the ticket this event concerns, for logging.
    pub fn ticket_id(&self) -> DbId {
        match self {
            Self::TicketCreated { ticket_id }
            | Self::SolutionSubmitted { ticket_id, .. }
            | Self::SolutionRated { ticket_id, .. }
            | Self::TicketStatusUpdated { ticket_id, .. }
            | Self::TicketReassigned { ticket_id, .. }
            | Self::RatingReminderDue { ticket_id, .. } => *ticket_id,
        }
    }

    /// Flat key/value payload for this event, the inverse of
    /// [`from_payload`](Self::from_payload).
    pub fn payload(&self) -> Value {
        match self {
            Self::TicketCreated { ticket_id } => serde_json::json!({
                "ticket_id": ticket_id,
            }),
            Self::SolutionSubmitted {
                solution_id,
                ticket_id,
                moderator_id,
                user_id,
                time_to_resolve_hours,
            } => serde_json::json!({
                "solution_id": solution_id,
                "ticket_id": ticket_id,
                "moderator_id": moderator_id,
                "user_id": user_id,
                "time_to_resolve_hours": time_to_resolve_hours,
            }),
            Self::SolutionRated {
                rating_id,
                solution_id,
                ticket_id,
                moderator_id,
                user_id,
                rating,
                was_helpful,
                issue_resolved,
            } => serde_json::json!({
                "rating_id": rating_id,
                "solution_id": solution_id,
                "ticket_id": ticket_id,
                "moderator_id": moderator_id,
                "user_id": user_id,
                "rating": rating,
                "was_helpful": was_helpful,
                "issue_resolved": issue_resolved,
            }),
            Self::TicketStatusUpdated {
                ticket_id,
                old_status,
                new_status,
                updated_by,
            } => serde_json::json!({
                "ticket_id": ticket_id,
                "old_status": old_status.as_str(),
                "new_status": new_status.as_str(),
                "updated_by": updated_by,
            }),
            Self::TicketReassigned {
                ticket_id,
                old_assignee,
                new_assignee,
                reassigned_by,
            } => serde_json::json!({
                "ticket_id": ticket_id,
                "old_assignee": old_assignee,
                "new_assignee": new_assignee,
                "reassigned_by": reassigned_by,
            }),
            Self::RatingReminderDue {
                ticket_id,
                solution_id,
                user_id,
            } => serde_json::json!({
                "ticket_id": ticket_id,
                "solution_id": solution_id,
                "user_id": user_id,
            }),
        }
    }

    /// Parse and validate an event from its wire name and flat payload.
    pub fn from_payload(name: &str, payload: &Value) -> Result<Self, EventParseError> {
        let obj = payload.as_object().ok_or(EventParseError::NotAnObject)?;

        let event = match name {
            TICKET_CREATED => {
                let mut fields = Fields::new(TICKET_CREATED, obj);
                let event = Self::TicketCreated {
                    ticket_id: fields.id("ticket_id")?,
                };
                fields.finish()?;
                event
            }
            SOLUTION_SUBMITTED => {
                let mut fields = Fields::new(SOLUTION_SUBMITTED, obj);
                let event = Self::SolutionSubmitted {
                    solution_id: fields.id("solution_id")?,
                    ticket_id: fields.id("ticket_id")?,
                    moderator_id: fields.id("moderator_id")?,
                    user_id: fields.id("user_id")?,
                    time_to_resolve_hours: fields.id("time_to_resolve_hours")?,
                };
                fields.finish()?;
                event
            }
            SOLUTION_RATED => {
                let mut fields = Fields::new(SOLUTION_RATED, obj);
                let event = Self::SolutionRated {
                    rating_id: fields.id("rating_id")?,
                    solution_id: fields.id("solution_id")?,
                    ticket_id: fields.id("ticket_id")?,
                    moderator_id: fields.id("moderator_id")?,
                    user_id: fields.id("user_id")?,
                    rating: fields.small_int("rating")?,
                    was_helpful: fields.boolean("was_helpful")?,
                    issue_resolved: fields.boolean("issue_resolved")?,
                };
                fields.finish()?;
                event
            }
            TICKET_STATUS_UPDATED => {
                let mut fields = Fields::new(TICKET_STATUS_UPDATED, obj);
                let event = Self::TicketStatusUpdated {
                    ticket_id: fields.id("ticket_id")?,
                    old_status: fields.status("old_status")?,
                    new_status: fields.status("new_status")?,
                    updated_by: fields.id("updated_by")?,
                };
                fields.finish()?;
                event
            }
            TICKET_REASSIGNED => {
                let mut fields = Fields::new(TICKET_REASSIGNED, obj);
                let event = Self::TicketReassigned {
                    ticket_id: fields.id("ticket_id")?,
                    old_assignee: fields.optional_id("old_assignee")?,
                    new_assignee: fields.optional_id("new_assignee")?,
                    reassigned_by: fields.id("reassigned_by")?,
                };
                fields.finish()?;
                event
            }
            RATING_REMINDER_DUE => {
                let mut fields = Fields::new(RATING_REMINDER_DUE, obj);
                let event = Self::RatingReminderDue {
                    ticket_id: fields.id("ticket_id")?,
                    solution_id: fields.id("solution_id")?,
                    user_id: fields.id("user_id")?,
                };
                fields.finish()?;
                event
            }
            other => return Err(EventParseError::UnknownEvent(other.to_string())),
        };

        Ok(event)
    }
}

/// Tracks which payload keys were consumed so leftovers can be rejected.
struct Fields<'a> {
    event: &'static str,
    obj: &'a Map<String, Value>,
    seen: Vec<&'static str>,
}

impl<'a> Fields<'a> {
    fn new(event: &'static str, obj: &'a Map<String, Value>) -> Self {
        Self {
            event,
            obj,
            seen: Vec::with_capacity(obj.len()),
        }
    }

    fn take(&mut self, field: &'static str) -> Result<&'a Value, EventParseError> {
        self.seen.push(field);
        self.obj.get(field).ok_or(EventParseError::MissingField {
            event: self.event,
            field,
        })
    }

    fn id(&mut self, field: &'static str) -> Result<i64, EventParseError> {
        self.take(field)?
            .as_i64()
            .ok_or(EventParseError::InvalidField {
                field,
                expected: "integer",
            })
    }

    fn optional_id(&mut self, field: &'static str) -> Result<Option<i64>, EventParseError> {
        match self.take(field)? {
            Value::Null => Ok(None),
            value => value
                .as_i64()
                .map(Some)
                .ok_or(EventParseError::InvalidField {
                    field,
                    expected: "integer or null",
                }),
        }
    }

    fn small_int(&mut self, field: &'static str) -> Result<i16, EventParseError> {
        self.take(field)?
            .as_i64()
            .and_then(|v| i16::try_from(v).ok())
            .ok_or(EventParseError::InvalidField {
                field,
                expected: "small integer",
            })
    }

    fn boolean(&mut self, field: &'static str) -> Result<bool, EventParseError> {
        self.take(field)?
            .as_bool()
            .ok_or(EventParseError::InvalidField {
                field,
                expected: "boolean",
            })
    }

    fn status(&mut self, field: &'static str) -> Result<TicketStatus, EventParseError> {
        self.take(field)?
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or(EventParseError::InvalidField {
                field,
                expected: "ticket status",
            })
    }

    /// Reject any payload key that no field consumed.
    fn finish(self) -> Result<(), EventParseError> {
        for key in self.obj.keys() {
            if !self.seen.iter().any(|s| *s == key.as_str()) {
                return Err(EventParseError::UnexpectedField(key.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn payload_round_trips_every_variant() {
        let events = [
            TicketEvent::TicketCreated { ticket_id: 1 },
            TicketEvent::SolutionSubmitted {
                solution_id: 2,
                ticket_id: 1,
                moderator_id: 3,
                user_id: 4,
                time_to_resolve_hours: 5,
            },
            TicketEvent::SolutionRated {
                rating_id: 6,
                solution_id: 2,
                ticket_id: 1,
                moderator_id: 3,
                user_id: 4,
                rating: 2,
                was_helpful: false,
                issue_resolved: false,
            },
            TicketEvent::TicketStatusUpdated {
                ticket_id: 1,
                old_status: TicketStatus::InProgress,
                new_status: TicketStatus::Resolved,
                updated_by: 3,
            },
            TicketEvent::TicketReassigned {
                ticket_id: 1,
                old_assignee: Some(3),
                new_assignee: None,
                reassigned_by: 7,
            },
            TicketEvent::RatingReminderDue {
                ticket_id: 1,
                solution_id: 2,
                user_id: 4,
            },
        ];

        for event in events {
            let parsed = TicketEvent::from_payload(event.name(), &event.payload()).unwrap();
            assert_eq!(parsed, event);
        }
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let err = TicketEvent::from_payload("ticket/archived", &serde_json::json!({}));
        assert_matches!(err, Err(EventParseError::UnknownEvent(name)) if name == "ticket/archived");
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = TicketEvent::from_payload(TICKET_CREATED, &serde_json::json!({}));
        assert_matches!(
            err,
            Err(EventParseError::MissingField { field: "ticket_id", .. })
        );
    }

    #[test]
    fn unexpected_field_is_rejected() {
        let err = TicketEvent::from_payload(
            TICKET_CREATED,
            &serde_json::json!({"ticket_id": 1, "title": "extra"}),
        );
        assert_matches!(err, Err(EventParseError::UnexpectedField(field)) if field == "title");
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = TicketEvent::from_payload(
            TICKET_CREATED,
            &serde_json::json!({"ticket_id": "not-a-number"}),
        );
        assert_matches!(err, Err(EventParseError::InvalidField { field: "ticket_id", .. }));
    }

    #[test]
    fn bad_status_string_is_rejected() {
        let err = TicketEvent::from_payload(
            TICKET_STATUS_UPDATED,
            &serde_json::json!({
                "ticket_id": 1,
                "old_status": "TODO",
                "new_status": "RESOLVED",
                "updated_by": 3,
            }),
        );
        assert_matches!(err, Err(EventParseError::InvalidField { field: "old_status", .. }));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = TicketEvent::from_payload(TICKET_CREATED, &serde_json::json!([1, 2]));
        assert_matches!(err, Err(EventParseError::NotAnObject));
    }

    #[test]
    fn null_assignees_parse_as_none() {
        let event = TicketEvent::from_payload(
            TICKET_REASSIGNED,
            &serde_json::json!({
                "ticket_id": 1,
                "old_assignee": null,
                "new_assignee": 9,
                "reassigned_by": 7,
            }),
        )
        .unwrap();
        assert_matches!(
            event,
            TicketEvent::TicketReassigned { old_assignee: None, new_assignee: Some(9), .. }
        );
    }
}
