//! # notify-adapters
//!
//! Delivery backends for the `Notifier` port: an SMTP mailer (feature
//! `mail-smtp`) and a log-only notifier for deployments without mail.

pub mod error;
pub mod log;

#[cfg(feature = "mail-smtp")]
pub mod smtp;

pub use error::NotifyError;
pub use log::LogNotifier;

#[cfg(feature = "mail-smtp")]
pub use smtp::{SmtpConfig, SmtpNotifier};

use domains::WarningMessage;

/// Subject line shared by every backend.
pub fn warning_subject(warning: &WarningMessage) -> String {
    format!("[Fruit Health Cloud] Pest warning: {}", warning.affected_scope)
}
