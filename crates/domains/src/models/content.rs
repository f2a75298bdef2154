//! Moderatable community content and its audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::labelled_enum;

/// Which table a piece of community content lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Post,
}

labelled_enum!(ContentKind, "target_type", {
    Article => "article",
    Post => "post",
});

/// Lifecycle of submitted content.
///
/// There is no rejected state. A rejection is recorded only in
/// the audit log and the content stays `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentStatus {
    #[default]
    Pending,
    Published,
}

labelled_enum!(ContentStatus, "content status", {
    Pending => "PENDING",
    Published => "PUBLISHED",
});

impl ContentStatus {
    /// The status after an audit decision is applied.
    pub fn after(self, outcome: AuditOutcome) -> ContentStatus {
        match outcome {
            AuditOutcome::Approved => ContentStatus::Published,
            AuditOutcome::Rejected => self,
        }
    }
}

/// Result label stored on each audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Approved,
    Rejected,
}

labelled_enum!(AuditOutcome, "audit result", {
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

impl AuditOutcome {
    pub fn from_approval(is_approved: bool) -> Self {
        if is_approved {
            AuditOutcome::Approved
        } else {
            AuditOutcome::Rejected
        }
    }
}

/// An article or forum post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    pub category: String,
    pub author_id: i64,
    pub status: ContentStatus,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub title: String,
    pub body: String,
    pub category: String,
}

/// One moderation decision, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditDecision {
    pub target_id: i64,
    pub target_kind: ContentKind,
    pub auditor_id: i64,
    pub outcome: AuditOutcome,
    pub feedback: Option<String>,
}

/// Immutable record of a moderation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub target_id: i64,
    pub target_kind: ContentKind,
    /// `None` once the auditing account no longer exists.
    pub auditor_id: Option<i64>,
    pub outcome: AuditOutcome,
    pub feedback: Option<String>,
    pub audit_time: DateTime<Utc>,
}

/// Narrowing for audit trail queries; `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    pub target_kind: Option<ContentKind>,
    pub target_id: Option<i64>,
}

impl AuditLogFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.target_kind.map_or(true, |k| k == entry.target_kind)
            && self.target_id.map_or(true, |id| id == entry.target_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_publishes_from_any_state() {
        assert_eq!(
            ContentStatus::Pending.after(AuditOutcome::Approved),
            ContentStatus::Published
        );
        assert_eq!(
            ContentStatus::Published.after(AuditOutcome::Approved),
            ContentStatus::Published
        );
    }

    #[test]
    fn rejection_leaves_status_unchanged() {
        assert_eq!(
            ContentStatus::Pending.after(AuditOutcome::Rejected),
            ContentStatus::Pending
        );
        assert_eq!(
            ContentStatus::Published.after(AuditOutcome::Rejected),
            ContentStatus::Published
        );
    }

    #[test]
    fn new_content_defaults_to_pending() {
        assert_eq!(ContentStatus::default(), ContentStatus::Pending);
    }

    #[test]
    fn filter_matches_on_kind_and_id() {
        let entry = AuditLogEntry {
            id: 1,
            target_id: 7,
            target_kind: ContentKind::Post,
            auditor_id: Some(2),
            outcome: AuditOutcome::Rejected,
            feedback: None,
            audit_time: Utc::now(),
        };
        assert!(AuditLogFilter::default().matches(&entry));
        assert!(AuditLogFilter { target_kind: Some(ContentKind::Post), target_id: Some(7) }.matches(&entry));
        assert!(!AuditLogFilter { target_kind: Some(ContentKind::Article), target_id: None }.matches(&entry));
        assert!(!AuditLogFilter { target_kind: None, target_id: Some(8) }.matches(&entry));
    }
}
