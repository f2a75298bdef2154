//! Notifier that only writes the broadcast to the log.

use async_trait::async_trait;
use domains::{DomainResult, Notifier, WarningMessage};
use tracing::info;

use crate::warning_subject;

#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn broadcast_warning(&self, recipients: &[String], warning: &WarningMessage) -> DomainResult<usize> {
        info!(
            warning_id = warning.id,
            level = %warning.level,
            recipients = recipients.len(),
            subject = %warning_subject(warning),
            "mail disabled; warning broadcast logged only"
        );
        Ok(recipients.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domains::WarningLevel;

    #[tokio::test]
    async fn reports_every_recipient_as_handled() {
        let warning = WarningMessage {
            id: 3,
            level: WarningLevel::Urgent,
            affected_scope: "All orchards".into(),
            prevention_measures: "Cover young fruit".into(),
            publish_time: Utc::now(),
            expire_time: Utc::now() + Duration::hours(6),
        };
        let recipients = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        assert_eq!(LogNotifier::new().broadcast_warning(&recipients, &warning).await.unwrap(), 2);
    }
}
