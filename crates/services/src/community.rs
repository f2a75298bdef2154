//! # Moderation Workflow
//!
//! Articles and posts enter as `PENDING`. Only an approving audit decision
//! moves them to `PUBLISHED`; a rejection leaves them pending and exists
//! only as an audit log entry.

use std::sync::Arc;

use domains::{
    AuditDecision, AuditLogEntry, AuditLogFilter, AuditOutcome, Content, ContentKind,
    ContentRepository, ContentStatus, NewContent, Page, User,
};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};

pub struct CommunityService {
    content: Arc<dyn ContentRepository>,
}

impl CommunityService {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    /// Submits content on behalf of `author`. The result is always pending.
    pub async fn submit(&self, kind: ContentKind, author: &User, new: NewContent) -> ServiceResult<Content> {
        let created = self.content.insert(kind, author.id, new).await?;
        info!(kind = %kind, content_id = created.id, author_id = author.id, "content submitted for review");
        Ok(created)
    }

    pub async fn list_published(&self, kind: ContentKind, page: Page) -> ServiceResult<Vec<Content>> {
        Ok(self.content.list_by_status(kind, ContentStatus::Published, page).await?)
    }

    pub async fn list_pending(&self, kind: ContentKind, page: Page) -> ServiceResult<Vec<Content>> {
        Ok(self.content.list_by_status(kind, ContentStatus::Pending, page).await?)
    }

    /// Records one moderation decision and returns the target as it stands
    /// afterwards.
    ///
    /// Approval publishes (again, if already published). Rejection changes
    /// nothing but the log. Every call appends exactly one log entry, in the
    /// same transaction as any status change.
    pub async fn submit_for_audit(
        &self,
        target_id: i64,
        target_kind: ContentKind,
        auditor: &User,
        approve: bool,
        feedback: Option<String>,
    ) -> ServiceResult<Content> {
        let decision = AuditDecision {
            target_id,
            target_kind,
            auditor_id: auditor.id,
            outcome: AuditOutcome::from_approval(approve),
            feedback,
        };

        let (content, entry) = self
            .content
            .record_audit(decision)
            .await?
            .ok_or_else(|| ServiceError::not_found(target_kind.as_str(), target_id))?;

        info!(
            kind = %target_kind,
            content_id = target_id,
            auditor_id = auditor.id,
            outcome = %entry.outcome,
            status = %content.status,
            "audit decision recorded"
        );
        Ok(content)
    }

    pub async fn audit_trail(&self, filter: AuditLogFilter, page: Page) -> ServiceResult<Vec<AuditLogEntry>> {
        Ok(self.content.list_audit_logs(filter, page).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockContentRepository, Role};

    fn admin() -> User {
        User {
            id: 1,
            email: "admin@x.com".into(),
            username: "admin".into(),
            password_hash: String::new(),
            role: Role::Admin,
            phone: None,
            is_verified: true,
            created_at: Utc::now(),
        }
    }

    fn content(id: i64, kind: ContentKind, status: ContentStatus) -> Content {
        Content {
            id,
            kind,
            title: "Codling moth season".into(),
            body: "Watch the traps.".into(),
            category: "pests".into(),
            author_id: 2,
            status,
            views: 0,
            created_at: Utc::now(),
        }
    }

    fn entry(decision: &AuditDecision) -> AuditLogEntry {
        AuditLogEntry {
            id: 10,
            target_id: decision.target_id,
            target_kind: decision.target_kind,
            auditor_id: Some(decision.auditor_id),
            outcome: decision.outcome,
            feedback: decision.feedback.clone(),
            audit_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn approval_returns_published_content() {
        let mut repo = MockContentRepository::new();
        repo.expect_record_audit()
            .withf(|d| d.outcome == AuditOutcome::Approved && d.auditor_id == 1)
            .returning(|d| {
                let c = content(d.target_id, d.target_kind, ContentStatus::Pending.after(d.outcome));
                Ok(Some((c, entry(&d))))
            });

        let service = CommunityService::new(Arc::new(repo));
        let result = service
            .submit_for_audit(5, ContentKind::Article, &admin(), true, None)
            .await
            .unwrap();
        assert_eq!(result.status, ContentStatus::Published);
    }

    #[tokio::test]
    async fn rejection_carries_feedback_and_keeps_pending() {
        let mut repo = MockContentRepository::new();
        repo.expect_record_audit()
            .withf(|d| d.outcome == AuditOutcome::Rejected && d.feedback.as_deref() == Some("off-topic"))
            .returning(|d| {
                let c = content(d.target_id, d.target_kind, ContentStatus::Pending.after(d.outcome));
                Ok(Some((c, entry(&d))))
            });

        let service = CommunityService::new(Arc::new(repo));
        let result = service
            .submit_for_audit(5, ContentKind::Post, &admin(), false, Some("off-topic".into()))
            .await
            .unwrap();
        assert_eq!(result.status, ContentStatus::Pending);
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let mut repo = MockContentRepository::new();
        repo.expect_record_audit().returning(|_| Ok(None));

        let service = CommunityService::new(Arc::new(repo));
        let err = service
            .submit_for_audit(404, ContentKind::Post, &admin(), true, None)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotFound("post 404".into()));
    }

    #[tokio::test]
    async fn listings_filter_on_exact_status() {
        let mut repo = MockContentRepository::new();
        repo.expect_list_by_status()
            .withf(|kind, status, _| *kind == ContentKind::Article && *status == ContentStatus::Published)
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        repo.expect_list_by_status()
            .withf(|kind, status, _| *kind == ContentKind::Post && *status == ContentStatus::Pending)
            .times(1)
            .returning(|kind, status, _| Ok(vec![content(3, kind, status)]));

        let service = CommunityService::new(Arc::new(repo));
        assert!(service.list_published(ContentKind::Article, Page::default()).await.unwrap().is_empty());
        let pending = service.list_pending(ContentKind::Post, Page::default()).await.unwrap();
        assert_eq!(pending.len(), 1);
    }
}
