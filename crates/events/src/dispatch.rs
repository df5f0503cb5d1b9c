//! Best-effort multi-recipient notification dispatch.
//!
//! Every recipient is attempted independently: one bad address never
//! blocks the others, and failures are logged, never raised. Callers get
//! a [`DeliveryReport`] so the single policy decision (log and move on)
//! lives here instead of a try/catch around every send.

use std::sync::Arc;

use crate::mailer::MailTransport;
use crate::templates::Notification;

/// One notification addressed to one recipient.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub address: String,
    pub notification: Notification,
}

impl Recipient {
    pub fn new(address: impl Into<String>, notification: Notification) -> Self {
        Self {
            address: address.into(),
            notification,
        }
    }
}

/// Per-recipient outcome of one dispatch call.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub address: String,
    pub kind: &'static str,
    /// `None` on success, otherwise the rendered send error.
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated result of one dispatch call.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    /// Number of recipients attempted.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of successful deliveries.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Number of failed deliveries.
    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }
}

/// Sends notifications through the configured transport, isolating
/// per-recipient failures.
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the given transport.
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Attempt delivery to every recipient, in order, regardless of
    /// individual failures.
    pub async fn notify(&self, recipients: Vec<Recipient>) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for recipient in recipients {
            let kind = recipient.notification.kind();
            let subject = recipient.notification.subject();
            let body = recipient.notification.body();

            let error = match self
                .transport
                .send(&recipient.address, &subject, &body)
                .await
            {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(
                        to = %recipient.address,
                        kind,
                        error = %e,
                        "Notification delivery failed"
                    );
                    Some(e.to_string())
                }
            };

            report.outcomes.push(DeliveryOutcome {
                address: recipient.address,
                kind,
                error,
            });
        }

        if report.failed() > 0 {
            tracing::warn!(
                attempted = report.attempted(),
                failed = report.failed(),
                "Notification dispatch finished with failures"
            );
        } else {
            tracing::debug!(attempted = report.attempted(), "Notification dispatch finished");
        }

        report
    }

    /// Convenience for the common single-recipient case.
    pub async fn notify_one(
        &self,
        address: impl Into<String>,
        notification: Notification,
    ) -> DeliveryReport {
        self.notify(vec![Recipient::new(address, notification)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MailError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Transport fake that fails for configured addresses and records
    /// every attempt.
    struct FakeTransport {
        failing: Vec<String>,
        sent: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MailTransport for FakeTransport {
        async fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(to.to_string());
            if self.failing.iter().any(|f| f == to) {
                Err(MailError::Build("mailbox unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn reminder(title: &str) -> Notification {
        Notification::RatingReminder {
            ticket_title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_block_the_others() {
        let transport = Arc::new(FakeTransport::new(&["b@example.com"]));
        let dispatcher = NotificationDispatcher::new(transport.clone());

        let report = dispatcher
            .notify(vec![
                Recipient::new("a@example.com", reminder("t")),
                Recipient::new("b@example.com", reminder("t")),
                Recipient::new("c@example.com", reminder("t")),
            ])
            .await;

        // All three were attempted, in insertion order.
        assert_eq!(
            *transport.sent.lock().unwrap(),
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.outcomes[1].succeeded());
        assert_eq!(report.outcomes[1].address, "b@example.com");
    }

    #[tokio::test]
    async fn empty_recipient_list_yields_empty_report() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FakeTransport::new(&[])));
        let report = dispatcher.notify(vec![]).await;
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.failed(), 0);
    }

    #[tokio::test]
    async fn outcome_records_template_kind() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FakeTransport::new(&[])));
        let report = dispatcher.notify_one("a@example.com", reminder("t")).await;
        assert_eq!(report.outcomes[0].kind, "rating-reminder");
    }
}
