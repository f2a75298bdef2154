//! # Core Traits (Ports)
//!
//! Storage, credential and delivery contracts. Adapters implement these;
//! services only ever hold them as `Arc<dyn Trait>`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::errors::{DomainResult, TokenError};
use crate::models::{
    AuditDecision, AuditLogEntry, AuditLogFilter, Content, ContentKind, ContentStatus,
    GovernanceRecord, GovernanceRecordPatch, NewContent, NewGovernanceRecord, NewPestInfo,
    NewPreventionScheme, NewUser, NewWarning, Page, PestInfo, PestInfoPatch, PreventionScheme,
    User, WarningMessage,
};

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`DomainError::Conflict`](crate::DomainError::Conflict) when
    /// the email is already registered. The check must be atomic with the insert.
    async fn insert(&self, user: NewUser) -> DomainResult<User>;
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> DomainResult<()>;
    /// Every registered email, in id order.
    async fn list_emails(&self) -> DomainResult<Vec<String>>;
}

/// Articles, posts and their moderation log.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Stores new content as [`ContentStatus::Pending`].
    async fn insert(&self, kind: ContentKind, author_id: i64, content: NewContent) -> DomainResult<Content>;
    /// Content whose status equals `status`, ordered by id.
    async fn list_by_status(&self, kind: ContentKind, status: ContentStatus, page: Page) -> DomainResult<Vec<Content>>;

    /// Applies `decision` to its target and appends the audit log entry in one
    /// transaction. Returns `None` without writing anything when the target
    /// does not exist.
    async fn record_audit(&self, decision: AuditDecision) -> DomainResult<Option<(Content, AuditLogEntry)>>;

    /// Audit trail, newest first.
    async fn list_audit_logs(&self, filter: AuditLogFilter, page: Page) -> DomainResult<Vec<AuditLogEntry>>;
}

/// Farmer-owned governance records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GovernanceRepository: Send + Sync {
    async fn insert(&self, owner_id: i64, record: NewGovernanceRecord) -> DomainResult<GovernanceRecord>;
    async fn find(&self, id: i64) -> DomainResult<Option<GovernanceRecord>>;
    async fn list_by_owner(&self, owner_id: i64, page: Page) -> DomainResult<Vec<GovernanceRecord>>;
    async fn list_all(&self, page: Page) -> DomainResult<Vec<GovernanceRecord>>;
    /// `None` when the record does not exist.
    async fn update(&self, id: i64, patch: GovernanceRecordPatch) -> DomainResult<Option<GovernanceRecord>>;
    /// `false` when the record did not exist.
    async fn delete(&self, id: i64) -> DomainResult<bool>;
}

/// Pest knowledge base.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    async fn insert_pest(&self, pest: NewPestInfo) -> DomainResult<PestInfo>;
    /// Returned entries carry their prevention schemes.
    async fn find_pest(&self, id: i64) -> DomainResult<Option<PestInfo>>;
    async fn list_pests(&self, page: Page) -> DomainResult<Vec<PestInfo>>;
    async fn update_pest(&self, id: i64, patch: PestInfoPatch) -> DomainResult<Option<PestInfo>>;
    /// Also removes the entry's prevention schemes.
    async fn delete_pest(&self, id: i64) -> DomainResult<bool>;
    /// `None` when the parent pest entry does not exist.
    async fn insert_scheme(&self, pest_id: i64, scheme: NewPreventionScheme) -> DomainResult<Option<PreventionScheme>>;
    async fn delete_scheme(&self, id: i64) -> DomainResult<bool>;
}

/// Broadcast warnings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WarningRepository: Send + Sync {
    async fn insert(&self, warning: NewWarning, publish_time: DateTime<Utc>) -> DomainResult<WarningMessage>;
    /// Warnings with `expire_time > now`, newest `publish_time` first.
    async fn list_active(&self, now: DateTime<Utc>, page: Page) -> DomainResult<Vec<WarningMessage>>;
    async fn delete(&self, id: i64) -> DomainResult<bool>;
}

/// Salted, slow, one-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> DomainResult<String>;
    /// `Ok(false)` on mismatch; errors are reserved for unusable hashes.
    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool>;
}

/// Stateless, signed, expiring session tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn default_ttl(&self) -> Duration;
    /// Signs a token whose subject is `principal_id` and whose expiry is `now + ttl`.
    fn issue(&self, principal_id: i64, ttl: Duration) -> Result<String, TokenError>;
    /// Returns the subject of a token with a valid signature and a future expiry.
    fn verify(&self, token: &str) -> Result<i64, TokenError>;
}

/// Outbound warning delivery (e.g., SMTP).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns how many recipients were handed to the transport.
    async fn broadcast_warning(&self, recipients: &[String], warning: &WarningMessage) -> DomainResult<usize>;
}
