//! Pest warnings and their broadcast.

use std::sync::Arc;

use chrono::Utc;
use domains::{NewWarning, Page, User, WarningMessage, WarningRepository};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::notify::NotificationDispatcher;

pub struct WarningService {
    warnings: Arc<dyn WarningRepository>,
    dispatcher: NotificationDispatcher,
}

impl WarningService {
    pub fn new(warnings: Arc<dyn WarningRepository>, dispatcher: NotificationDispatcher) -> Self {
        Self { warnings, dispatcher }
    }

    /// Stores the warning, then schedules the email broadcast. The broadcast
    /// starts only after the insert has committed and never affects the result.
    pub async fn publish(&self, publisher: &User, warning: NewWarning) -> ServiceResult<WarningMessage> {
        let created = self.warnings.insert(warning, Utc::now()).await?;
        info!(
            warning_id = created.id,
            publisher_id = publisher.id,
            level = %created.level,
            expire_time = %created.expire_time,
            "warning published"
        );

        self.dispatcher.dispatch_warning(created.clone());
        Ok(created)
    }

    pub async fn list_active(&self, page: Page) -> ServiceResult<Vec<WarningMessage>> {
        Ok(self.warnings.list_active(Utc::now(), page).await?)
    }

    pub async fn delete(&self, actor: &User, id: i64) -> ServiceResult<()> {
        if !self.warnings.delete(id).await? {
            return Err(ServiceError::not_found("warning", id));
        }
        info!(warning_id = id, actor_id = actor.id, "warning withdrawn");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{DomainError, MockNotifier, MockUserRepository, MockWarningRepository, Role, WarningLevel};
    use std::time::Duration as StdDuration;

    fn expert() -> User {
        User {
            id: 2,
            email: "expert@x.com".into(),
            username: "expert".into(),
            password_hash: String::new(),
            role: Role::Expert,
            phone: None,
            is_verified: true,
            created_at: Utc::now(),
        }
    }

    fn new_warning() -> NewWarning {
        NewWarning {
            level: WarningLevel::Normal,
            affected_scope: "Hillside".into(),
            prevention_measures: "Inspect leaves daily.".into(),
            expire_time: Utc::now() + Duration::days(1),
        }
    }

    #[tokio::test]
    async fn publish_succeeds_even_when_recipient_lookup_fails() {
        let mut warnings = MockWarningRepository::new();
        warnings.expect_insert().returning(|w, publish_time| {
            Ok(WarningMessage {
                id: 8,
                level: w.level,
                affected_scope: w.affected_scope,
                prevention_measures: w.prevention_measures,
                publish_time,
                expire_time: w.expire_time,
            })
        });
        let (tx, rx) = std::sync::mpsc::channel();
        let mut users = MockUserRepository::new();
        users.expect_list_emails().returning(move || {
            let _ = tx.send(());
            Err(DomainError::Internal("connection reset".into()))
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_broadcast_warning().never();

        let dispatcher =
            NotificationDispatcher::new(Arc::new(users), Arc::new(notifier), StdDuration::from_secs(5));
        let service = WarningService::new(Arc::new(warnings), dispatcher);

        let published = service.publish(&expert(), new_warning()).await.unwrap();
        assert_eq!(published.id, 8);

        // The broadcast still runs in the background.
        tokio::task::spawn_blocking(move || rx.recv_timeout(StdDuration::from_secs(5)))
            .await
            .unwrap()
            .expect("broadcast task never ran");
    }

    #[tokio::test]
    async fn deleting_unknown_warning_is_not_found() {
        let mut warnings = MockWarningRepository::new();
        warnings.expect_delete().returning(|_| Ok(false));
        let dispatcher = NotificationDispatcher::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockNotifier::new()),
            StdDuration::from_secs(5),
        );
        let service = WarningService::new(Arc::new(warnings), dispatcher);

        assert_eq!(
            service.delete(&expert(), 3).await.unwrap_err(),
            ServiceError::NotFound("warning 3".into())
        );
    }
}
