use async_trait::async_trait;
use domains::{
    DomainResult, GovernanceRecord, GovernanceRecordPatch, GovernanceRepository,
    NewGovernanceRecord, Page,
};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{column, db_err, label};

const RECORD_COLUMNS: &str = "id, user_id, pest_type, found_time, location, status, description, photos";

pub struct PgGovernanceRepository {
    pool: PgPool,
}

impl PgGovernanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_record(row: &PgRow) -> DomainResult<GovernanceRecord> {
    let Json(photos): Json<Vec<String>> = column(row, "photos")?;
    Ok(GovernanceRecord {
        id: column(row, "id")?,
        user_id: column(row, "user_id")?,
        pest_type: column(row, "pest_type")?,
        found_time: column(row, "found_time")?,
        location: column(row, "location")?,
        status: label(row, "status")?,
        description: column(row, "description")?,
        photos,
    })
}

#[async_trait]
impl GovernanceRepository for PgGovernanceRepository {
    async fn insert(&self, owner_id: i64, record: NewGovernanceRecord) -> DomainResult<GovernanceRecord> {
        let sql = format!(
            "INSERT INTO governance_records (user_id, pest_type, found_time, location, status, description, photos) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(owner_id)
            .bind(&record.pest_type)
            .bind(record.found_time)
            .bind(&record.location)
            .bind(record.status.as_str())
            .bind(&record.description)
            .bind(Json(&record.photos))
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        map_record(&row)
    }

    async fn find(&self, id: i64) -> DomainResult<Option<GovernanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM governance_records WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_record).transpose()
    }

    async fn list_by_owner(&self, owner_id: i64, page: Page) -> DomainResult<Vec<GovernanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM governance_records WHERE user_id = $1 ORDER BY id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_record).collect()
    }

    async fn list_all(&self, page: Page) -> DomainResult<Vec<GovernanceRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM governance_records ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_record).collect()
    }

    /// Absent patch fields are bound as NULL and kept through `COALESCE`.
    async fn update(&self, id: i64, patch: GovernanceRecordPatch) -> DomainResult<Option<GovernanceRecord>> {
        let sql = format!(
            "UPDATE governance_records SET \
                pest_type   = COALESCE($2, pest_type), \
                found_time  = COALESCE($3, found_time), \
                location    = COALESCE($4, location), \
                status      = COALESCE($5, status), \
                description = COALESCE($6, description), \
                photos      = COALESCE($7, photos) \
             WHERE id = $1 RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(&patch.pest_type)
            .bind(patch.found_time)
            .bind(&patch.location)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(&patch.description)
            .bind(patch.photos.as_ref().map(Json))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_record).transpose()
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM governance_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
