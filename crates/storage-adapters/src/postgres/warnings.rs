use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{DomainResult, NewWarning, Page, WarningMessage, WarningRepository};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::{column, db_err, label};

const WARNING_COLUMNS: &str = "id, level, affected_scope, prevention_measures, publish_time, expire_time";

pub struct PgWarningRepository {
    pool: PgPool,
}

impl PgWarningRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_warning(row: &PgRow) -> DomainResult<WarningMessage> {
    Ok(WarningMessage {
        id: column(row, "id")?,
        level: label(row, "level")?,
        affected_scope: column(row, "affected_scope")?,
        prevention_measures: column(row, "prevention_measures")?,
        publish_time: column(row, "publish_time")?,
        expire_time: column(row, "expire_time")?,
    })
}

#[async_trait]
impl WarningRepository for PgWarningRepository {
    async fn insert(&self, warning: NewWarning, publish_time: DateTime<Utc>) -> DomainResult<WarningMessage> {
        let sql = format!(
            "INSERT INTO warning_messages (level, affected_scope, prevention_measures, publish_time, expire_time) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {WARNING_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(warning.level.as_str())
            .bind(&warning.affected_scope)
            .bind(&warning.prevention_measures)
            .bind(publish_time)
            .bind(warning.expire_time)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        map_warning(&row)
    }

    async fn list_active(&self, now: DateTime<Utc>, page: Page) -> DomainResult<Vec<WarningMessage>> {
        let sql = format!(
            "SELECT {WARNING_COLUMNS} FROM warning_messages WHERE expire_time > $1 \
             ORDER BY publish_time DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(now)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_warning).collect()
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM warning_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
