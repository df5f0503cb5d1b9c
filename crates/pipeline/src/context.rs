//! Injected dependencies shared by all pipeline handlers.

use std::sync::Arc;
use std::time::Duration;

use deskpilot_classifier::Triage;
use deskpilot_db::DbPool;
use deskpilot_events::{EventBus, NotificationDispatcher};

/// Default delay before the post-solution rating reminder fires.
const DEFAULT_RATING_REMINDER_DELAY: Duration = Duration::from_secs(3600);

/// Everything a handler needs, constructed once at process start and
/// shared via `Arc`. There is no ambient global state; tests substitute
/// fakes for the classifier and the mail transport.
pub struct PipelineContext {
    pub pool: DbPool,
    pub triage: Arc<dyn Triage>,
    pub dispatcher: NotificationDispatcher,
    pub bus: Arc<EventBus>,
    pub rating_reminder_delay: Duration,
}

impl PipelineContext {
    pub fn new(
        pool: DbPool,
        triage: Arc<dyn Triage>,
        dispatcher: NotificationDispatcher,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            triage,
            dispatcher,
            bus,
            rating_reminder_delay: DEFAULT_RATING_REMINDER_DELAY,
        }
    }

    /// Override the rating-reminder delay (tests and small deployments).
    pub fn with_rating_reminder_delay(mut self, delay: Duration) -> Self {
        self.rating_reminder_delay = delay;
        self
    }
}
