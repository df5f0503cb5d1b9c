//! Closed lifecycle enums stored as TEXT columns.
//!
//! Every enum here maps to a fixed set of wire strings. Parsing is strict:
//! an unrecognized string is an error, never a silent default, so a bad
//! value in the database or an event payload surfaces at the boundary.

use serde::{Deserialize, Serialize};

/// Error returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// The wire/database string for this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// All variants, in declaration order.
            pub const ALL: &'static [$name] = &[ $( Self::$variant ),+ ];
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        // Enables `#[sqlx(try_from = "String")]` on model fields.
        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_text_enum! {
    /// Ticket lifecycle status.
    TicketStatus {
        Open = "OPEN",
        InProgress = "IN_PROGRESS",
        Resolved = "RESOLVED",
    }
}

define_text_enum! {
    /// Ticket priority, assigned by triage or moderator override.
    Priority {
        Low = "low",
        Medium = "medium",
        High = "high",
    }
}

define_text_enum! {
    /// Solution difficulty as judged by the authoring moderator.
    Difficulty {
        Easy = "easy",
        Medium = "medium",
        Hard = "hard",
    }
}

define_text_enum! {
    /// Derived quality label on a solution, computed from its rating.
    Effectiveness {
        Pending = "pending",
        Helpful = "helpful",
        PartiallyHelpful = "partially_helpful",
        NotHelpful = "not_helpful",
    }
}

impl Priority {
    /// Parse ignoring ASCII case. Classifier output is normalized through
    /// this; the strict `FromStr` stays exact for database round-trips.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_status_round_trips() {
        for status in TicketStatus::ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn ticket_status_rejects_unknown() {
        let err = "DONE".parse::<TicketStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown TicketStatus value: DONE");
        assert!("open".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn priority_lenient_parse_ignores_case() {
        assert_eq!(Priority::parse_lenient("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse_lenient(" Medium "), Some(Priority::Medium));
        assert_eq!(Priority::parse_lenient("urgent"), None);
    }

    #[test]
    fn effectiveness_wire_strings() {
        assert_eq!(Effectiveness::PartiallyHelpful.as_str(), "partially_helpful");
        assert_eq!(
            "not_helpful".parse::<Effectiveness>().unwrap(),
            Effectiveness::NotHelpful
        );
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(back, Difficulty::Hard);
    }

    #[test]
    fn try_from_string_for_row_decoding() {
        assert_eq!(
            TicketStatus::try_from("RESOLVED".to_string()).unwrap(),
            TicketStatus::Resolved
        );
        assert!(Priority::try_from("urgent".to_string()).is_err());
    }
}
