//! Event bus and notification infrastructure.
//!
//! This crate provides the building blocks the ticket pipeline is driven
//! by and delivers through:
//!
//! - [`TicketEvent`]: the closed set of domain events, with strict
//!   payload validation at the ingress boundary.
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MailTransport`] / [`SmtpMailer`]: the outbound mail seam and its
//!   lettre SMTP implementation.
//! - [`templates`]: one variant per notification kind, rendering subject
//!   and body.
//! - [`NotificationDispatcher`]: best-effort multi-recipient dispatch
//!   producing a per-recipient [`DeliveryReport`].

pub mod bus;
pub mod dispatch;
pub mod event;
pub mod mailer;
pub mod templates;

pub use bus::EventBus;
pub use dispatch::{DeliveryReport, NotificationDispatcher, Recipient};
pub use event::{EventParseError, TicketEvent};
pub use mailer::{MailError, MailTransport, NoopMailer, SmtpConfig, SmtpMailer};
pub use templates::Notification;
