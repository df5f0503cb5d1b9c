//! Triage classifier adapter.
//!
//! Wraps the external text-classification capability that derives a
//! ticket's priority, triage notes, and required skills from its free
//! text. The adapter owns three responsibilities the capability does not:
//!
//! - **Extraction** ([`extract`]): the capability answers in prose and may
//!   wrap its JSON in code fences; progressively looser strategies recover
//!   the structured payload.
//! - **Validation**: priority must be one of low/medium/high
//!   (case-insensitive), notes a string, skills a list of strings.
//! - **Fallback**: any transport error, timeout, or malformed payload is a
//!   soft failure resolved to [`TriageResult::fallback`]; the pipeline
//!   always proceeds with a usable result.

use async_trait::async_trait;
use deskpilot_core::skills::GENERAL_SUPPORT;
use deskpilot_core::status::Priority;

pub mod client;
pub mod extract;

pub use client::{ClassifierClient, ClassifierConfig};

/// Normalized triage output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageResult {
    pub priority: Priority,
    pub notes: String,
    pub skills: Vec<String>,
}

impl TriageResult {
    /// Deterministic result used whenever classification is unavailable
    /// or returns something unusable. Not an error: the ticket proceeds
    /// through assignment flagged for manual review.
    pub fn fallback() -> Self {
        Self {
            priority: Priority::Medium,
            notes: "Manual review required: automated triage unavailable.".to_string(),
            skills: vec![GENERAL_SUPPORT.to_string()],
        }
    }
}

/// The classification seam the pipeline depends on.
///
/// Implementations never fail; soft failures are resolved to the fallback
/// internally so callers have exactly one code path.
#[async_trait]
pub trait Triage: Send + Sync {
    async fn classify(&self, ticket_text: &str) -> TriageResult;
}

/// Triage implementation for deployments with no classifier configured.
/// Every ticket gets the fallback result.
pub struct FallbackTriage;

#[async_trait]
impl Triage for FallbackTriage {
    async fn classify(&self, _ticket_text: &str) -> TriageResult {
        TriageResult::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fallback_triage_always_returns_fallback() {
        let result = FallbackTriage.classify("my app crashes on startup").await;
        assert_eq!(result, TriageResult::fallback());
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.skills, vec![GENERAL_SUPPORT.to_string()]);
    }
}
