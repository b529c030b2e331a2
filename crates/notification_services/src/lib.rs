//! # Notification Services
//!
//! Persistent in-app notifications, live event broadcasting, and customer
//! email delivery for the reservation platform. Fan-out is best-effort:
//! a failed email or a dead live session never fails the booking write
//! that triggered it.

/// Live event broadcasting to connected sessions.
pub mod broadcaster;
/// Recipient resolution for role-targeted notifications.
pub mod directory;
/// Email delivery over AWS SES.
pub mod email;
/// Orchestration of store, live, and email fan-out.
pub mod fanout;
/// Persistent notification rows.
pub mod store;
/// Types and structures shared across the notification services.
pub mod types;

pub use broadcaster::LiveBroadcaster;
pub use directory::{PgRecipientDirectory, RecipientDirectory, dedupe_recipients};
pub use email::{EmailNotifier, EmailService, MockEmailService, SesEmailService};
pub use fanout::NotificationFanout;
pub use store::NotificationStore;
pub use types::{LiveEvent, Notification, NotifyError, Recipients};
