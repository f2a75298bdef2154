//! # In-memory repositories
//!
//! `dashmap`-backed implementations of every repository port. Used by the
//! integration suite and by local runs without a database. Ids come from
//! per-table atomic sequences starting at 1, like `BIGSERIAL`.
//!
//! No guard is ever held across an `.await`; every method body is synchronous.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use domains::{
    AuditDecision, AuditLogEntry, AuditLogFilter, Content, ContentKind, ContentRepository,
    ContentStatus, DomainError, DomainResult, GovernanceRecord, GovernanceRecordPatch,
    GovernanceRepository, KnowledgeRepository, NewContent, NewGovernanceRecord, NewPestInfo,
    NewPreventionScheme, NewUser, NewWarning, Page, PestInfo, PestInfoPatch, PreventionScheme,
    User, UserRepository, WarningMessage, WarningRepository,
};

#[derive(Debug)]
struct Sequence(AtomicI64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Values of `map` sorted by `key`, cloned out of the shards.
fn sorted_values<V: Clone, K: Ord>(map: &DashMap<i64, V>, key: impl Fn(&V) -> K) -> Vec<V> {
    let mut values: Vec<V> = map.iter().map(|e| e.value().clone()).collect();
    values.sort_by_key(|v| key(v));
    values
}

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<i64, User>,
    /// email -> id; the entry lock makes the uniqueness check atomic.
    by_email: DashMap<String, i64>,
    seq: Sequence,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> DomainResult<User> {
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict("email already registered".into())),
            Entry::Vacant(slot) => {
                let created = User {
                    id: self.seq.next(),
                    email: user.email,
                    username: user.username,
                    password_hash: user.password_hash,
                    role: user.role,
                    phone: user.phone,
                    is_verified: false,
                    created_at: Utc::now(),
                };
                self.users.insert(created.id, created.clone());
                slot.insert(created.id);
                Ok(created)
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.by_email.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> DomainResult<()> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.password_hash = password_hash.to_owned();
                Ok(())
            }
            None => Err(DomainError::NotFound("user", id.to_string())),
        }
    }

    async fn list_emails(&self) -> DomainResult<Vec<String>> {
        Ok(sorted_values(&self.users, |u| u.id).into_iter().map(|u| u.email).collect())
    }
}

// ── Content ─────────────────────────────────────────────────────────────────

/// Articles and posts live in separate tables with separate id sequences.
#[derive(Debug, Default)]
pub struct MemoryContentRepository {
    articles: DashMap<i64, Content>,
    posts: DashMap<i64, Content>,
    article_seq: Sequence,
    post_seq: Sequence,
    audit_logs: DashMap<i64, AuditLogEntry>,
    audit_seq: Sequence,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: ContentKind) -> (&DashMap<i64, Content>, &Sequence) {
        match kind {
            ContentKind::Article => (&self.articles, &self.article_seq),
            ContentKind::Post => (&self.posts, &self.post_seq),
        }
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn insert(&self, kind: ContentKind, author_id: i64, content: NewContent) -> DomainResult<Content> {
        let (table, seq) = self.table(kind);
        let created = Content {
            id: seq.next(),
            kind,
            title: content.title,
            body: content.body,
            category: content.category,
            author_id,
            status: ContentStatus::Pending,
            views: 0,
            created_at: Utc::now(),
        };
        table.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_by_status(&self, kind: ContentKind, status: ContentStatus, page: Page) -> DomainResult<Vec<Content>> {
        let all = sorted_values(self.table(kind).0, |c| c.id);
        Ok(page.slice(all.into_iter().filter(|c| c.status == status)))
    }

    async fn record_audit(&self, decision: AuditDecision) -> DomainResult<Option<(Content, AuditLogEntry)>> {
        let (table, _) = self.table(decision.target_kind);
        // The shard write lock on the target is held until the log entry is in.
        let Some(mut target) = table.get_mut(&decision.target_id) else {
            return Ok(None);
        };

        target.status = target.status.after(decision.outcome);
        let entry = AuditLogEntry {
            id: self.audit_seq.next(),
            target_id: decision.target_id,
            target_kind: decision.target_kind,
            auditor_id: Some(decision.auditor_id),
            outcome: decision.outcome,
            feedback: decision.feedback,
            audit_time: Utc::now(),
        };
        self.audit_logs.insert(entry.id, entry.clone());

        Ok(Some((target.clone(), entry)))
    }

    async fn list_audit_logs(&self, filter: AuditLogFilter, page: Page) -> DomainResult<Vec<AuditLogEntry>> {
        let mut entries = sorted_values(&self.audit_logs, |e| e.id);
        entries.reverse();
        Ok(page.slice(entries.into_iter().filter(|e| filter.matches(e))))
    }
}

// ── Governance ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryGovernanceRepository {
    records: DashMap<i64, GovernanceRecord>,
    seq: Sequence,
}

impl MemoryGovernanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GovernanceRepository for MemoryGovernanceRepository {
    async fn insert(&self, owner_id: i64, record: NewGovernanceRecord) -> DomainResult<GovernanceRecord> {
        let created = GovernanceRecord {
            id: self.seq.next(),
            user_id: owner_id,
            pest_type: record.pest_type,
            found_time: record.found_time,
            location: record.location,
            status: record.status,
            description: record.description,
            photos: record.photos,
        };
        self.records.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find(&self, id: i64) -> DomainResult<Option<GovernanceRecord>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn list_by_owner(&self, owner_id: i64, page: Page) -> DomainResult<Vec<GovernanceRecord>> {
        let all = sorted_values(&self.records, |r| r.id);
        Ok(page.slice(all.into_iter().filter(|r| r.user_id == owner_id)))
    }

    async fn list_all(&self, page: Page) -> DomainResult<Vec<GovernanceRecord>> {
        Ok(page.slice(sorted_values(&self.records, |r| r.id)))
    }

    async fn update(&self, id: i64, patch: GovernanceRecordPatch) -> DomainResult<Option<GovernanceRecord>> {
        Ok(self.records.get_mut(&id).map(|mut record| {
            patch.apply_to(&mut record);
            record.clone()
        }))
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }
}

// ── Knowledge ───────────────────────────────────────────────────────────────

/// Pest entries are stored without their schemes; schemes are joined on read.
#[derive(Debug, Default)]
pub struct MemoryKnowledgeRepository {
    pests: DashMap<i64, PestInfo>,
    schemes: DashMap<i64, PreventionScheme>,
    pest_seq: Sequence,
    scheme_seq: Sequence,
}

impl MemoryKnowledgeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_schemes(&self, mut pest: PestInfo) -> PestInfo {
        let mut schemes: Vec<PreventionScheme> = self
            .schemes
            .iter()
            .filter(|s| s.pest_id == pest.id)
            .map(|s| s.value().clone())
            .collect();
        schemes.sort_by_key(|s| s.id);
        pest.prevention_schemes = schemes;
        pest
    }
}

#[async_trait]
impl KnowledgeRepository for MemoryKnowledgeRepository {
    async fn insert_pest(&self, pest: NewPestInfo) -> DomainResult<PestInfo> {
        let created = PestInfo {
            id: self.pest_seq.next(),
            name: pest.name,
            category: pest.category,
            affected_part: pest.affected_part,
            symptom_description: pest.symptom_description,
            peak_season: pest.peak_season,
            typical_image: pest.typical_image,
            prevention_schemes: Vec::new(),
        };
        self.pests.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_pest(&self, id: i64) -> DomainResult<Option<PestInfo>> {
        let pest = self.pests.get(&id).map(|p| p.clone());
        Ok(pest.map(|p| self.with_schemes(p)))
    }

    async fn list_pests(&self, page: Page) -> DomainResult<Vec<PestInfo>> {
        let window = page.slice(sorted_values(&self.pests, |p| p.id));
        Ok(window.into_iter().map(|p| self.with_schemes(p)).collect())
    }

    async fn update_pest(&self, id: i64, patch: PestInfoPatch) -> DomainResult<Option<PestInfo>> {
        let updated = self.pests.get_mut(&id).map(|mut pest| {
            patch.apply_to(&mut pest);
            pest.clone()
        });
        Ok(updated.map(|p| self.with_schemes(p)))
    }

    async fn delete_pest(&self, id: i64) -> DomainResult<bool> {
        if self.pests.remove(&id).is_none() {
            return Ok(false);
        }
        self.schemes.retain(|_, s| s.pest_id != id);
        Ok(true)
    }

    async fn insert_scheme(&self, pest_id: i64, scheme: NewPreventionScheme) -> DomainResult<Option<PreventionScheme>> {
        // Holding the parent guard keeps a concurrent delete_pest from
        // removing the parent before the child lands.
        let Some(_parent) = self.pests.get(&pest_id) else {
            return Ok(None);
        };
        let created = PreventionScheme {
            id: self.scheme_seq.next(),
            pest_id,
            pesticide_name: scheme.pesticide_name,
            recommended_dosage: scheme.recommended_dosage,
            application_time: scheme.application_time,
            operation_spec: scheme.operation_spec,
        };
        self.schemes.insert(created.id, created.clone());
        Ok(Some(created))
    }

    async fn delete_scheme(&self, id: i64) -> DomainResult<bool> {
        Ok(self.schemes.remove(&id).is_some())
    }
}

// ── Warnings ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryWarningRepository {
    warnings: DashMap<i64, WarningMessage>,
    seq: Sequence,
}

impl MemoryWarningRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WarningRepository for MemoryWarningRepository {
    async fn insert(&self, warning: NewWarning, publish_time: DateTime<Utc>) -> DomainResult<WarningMessage> {
        let created = WarningMessage {
            id: self.seq.next(),
            level: warning.level,
            affected_scope: warning.affected_scope,
            prevention_measures: warning.prevention_measures,
            publish_time,
            expire_time: warning.expire_time,
        };
        self.warnings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_active(&self, now: DateTime<Utc>, page: Page) -> DomainResult<Vec<WarningMessage>> {
        let mut active: Vec<WarningMessage> = self
            .warnings
            .iter()
            .filter(|w| w.is_active_at(now))
            .map(|w| w.value().clone())
            .collect();
        active.sort_by(|a, b| b.publish_time.cmp(&a.publish_time).then(b.id.cmp(&a.id)));
        Ok(page.slice(active))
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        Ok(self.warnings.remove(&id).is_some())
    }
}
