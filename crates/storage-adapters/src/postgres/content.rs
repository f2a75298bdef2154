use async_trait::async_trait;
use domains::{
    AuditDecision, AuditLogEntry, AuditLogFilter, Content, ContentKind, ContentRepository,
    ContentStatus, DomainResult, NewContent, Page,
};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use tracing::debug;

use super::{column, db_err, label};

const CONTENT_COLUMNS: &str = "id, title, content, category, author_id, status, views, created_at";
const AUDIT_COLUMNS: &str = "id, target_id, target_type, auditor_id, result, feedback, audit_time";

pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn table(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Article => "articles",
        ContentKind::Post => "posts",
    }
}

fn map_content(kind: ContentKind, row: &PgRow) -> DomainResult<Content> {
    Ok(Content {
        id: column(row, "id")?,
        kind,
        title: column(row, "title")?,
        body: column(row, "content")?,
        category: column(row, "category")?,
        author_id: column(row, "author_id")?,
        status: label(row, "status")?,
        views: column(row, "views")?,
        created_at: column(row, "created_at")?,
    })
}

fn map_audit_entry(row: &PgRow) -> DomainResult<AuditLogEntry> {
    Ok(AuditLogEntry {
        id: column(row, "id")?,
        target_id: column(row, "target_id")?,
        target_kind: label(row, "target_type")?,
        auditor_id: column(row, "auditor_id")?,
        outcome: label(row, "result")?,
        feedback: column(row, "feedback")?,
        audit_time: column(row, "audit_time")?,
    })
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn insert(&self, kind: ContentKind, author_id: i64, content: NewContent) -> DomainResult<Content> {
        let sql = format!(
            "INSERT INTO {} (title, content, category, author_id, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CONTENT_COLUMNS}",
            table(kind)
        );
        let row = sqlx::query(&sql)
            .bind(&content.title)
            .bind(&content.body)
            .bind(&content.category)
            .bind(author_id)
            .bind(ContentStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        map_content(kind, &row)
    }

    async fn list_by_status(&self, kind: ContentKind, status: ContentStatus, page: Page) -> DomainResult<Vec<Content>> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM {} WHERE status = $1 ORDER BY id LIMIT $2 OFFSET $3",
            table(kind)
        );
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(|r| map_content(kind, r)).collect()
    }

    /// Locks the target row, applies the status change and appends the log
    /// entry in a single transaction. Dropping `tx` on any early return rolls
    /// everything back.
    async fn record_audit(&self, decision: AuditDecision) -> DomainResult<Option<(Content, AuditLogEntry)>> {
        let kind = decision.target_kind;
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // 1. Lock target
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM {} WHERE id = $1 FOR UPDATE", table(kind));
        let Some(row) = sqlx::query(&sql)
            .bind(decision.target_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
        else {
            debug!(target_id = decision.target_id, target_type = %kind, "audit target missing");
            return Ok(None);
        };
        let mut content = map_content(kind, &row)?;

        // 2. Apply status transition
        let next = content.status.after(decision.outcome);
        if next != content.status {
            let sql = format!("UPDATE {} SET status = $1 WHERE id = $2", table(kind));
            sqlx::query(&sql)
                .bind(next.as_str())
                .bind(content.id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            content.status = next;
        }

        // 3. Append log entry
        let sql = format!(
            "INSERT INTO audit_logs (target_id, target_type, auditor_id, result, feedback) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {AUDIT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(decision.target_id)
            .bind(kind.as_str())
            .bind(decision.auditor_id)
            .bind(decision.outcome.as_str())
            .bind(&decision.feedback)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
        let entry = map_audit_entry(&row)?;

        tx.commit().await.map_err(db_err)?;
        Ok(Some((content, entry)))
    }

    async fn list_audit_logs(&self, filter: AuditLogFilter, page: Page) -> DomainResult<Vec<AuditLogEntry>> {
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs \
             WHERE ($1::text IS NULL OR target_type = $1) \
               AND ($2::bigint IS NULL OR target_id = $2) \
             ORDER BY audit_time DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.target_kind.map(|k| k.as_str()))
            .bind(filter.target_id)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_audit_entry).collect()
    }
}
