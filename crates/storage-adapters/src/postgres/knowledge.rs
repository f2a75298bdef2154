use std::collections::HashMap;

use async_trait::async_trait;
use domains::{
    DomainResult, KnowledgeRepository, NewPestInfo, NewPreventionScheme, Page, PestInfo,
    PestInfoPatch, PreventionScheme,
};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::{column, db_err, label};

const PEST_COLUMNS: &str =
    "id, name, category, affected_part, symptom_description, peak_season, typical_image";
const SCHEME_COLUMNS: &str =
    "id, pest_id, pesticide_name, recommended_dosage, application_time, operation_spec";

pub struct PgKnowledgeRepository {
    pool: PgPool,
}

impl PgKnowledgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the schemes of every given entry with one query.
    async fn attach_schemes(&self, mut pests: Vec<PestInfo>) -> DomainResult<Vec<PestInfo>> {
        if pests.is_empty() {
            return Ok(pests);
        }
        let ids: Vec<i64> = pests.iter().map(|p| p.id).collect();
        let sql = format!("SELECT {SCHEME_COLUMNS} FROM prevention_schemes WHERE pest_id = ANY($1) ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut by_pest: HashMap<i64, Vec<PreventionScheme>> = HashMap::new();
        for row in &rows {
            let scheme = map_scheme(row)?;
            by_pest.entry(scheme.pest_id).or_default().push(scheme);
        }
        for pest in &mut pests {
            pest.prevention_schemes = by_pest.remove(&pest.id).unwrap_or_default();
        }
        Ok(pests)
    }

    async fn attach_one(&self, pest: Option<PestInfo>) -> DomainResult<Option<PestInfo>> {
        match pest {
            Some(p) => Ok(self.attach_schemes(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }
}

fn map_pest(row: &PgRow) -> DomainResult<PestInfo> {
    Ok(PestInfo {
        id: column(row, "id")?,
        name: column(row, "name")?,
        category: label(row, "category")?,
        affected_part: column(row, "affected_part")?,
        symptom_description: column(row, "symptom_description")?,
        peak_season: column(row, "peak_season")?,
        typical_image: column(row, "typical_image")?,
        prevention_schemes: Vec::new(),
    })
}

fn map_scheme(row: &PgRow) -> DomainResult<PreventionScheme> {
    Ok(PreventionScheme {
        id: column(row, "id")?,
        pest_id: column(row, "pest_id")?,
        pesticide_name: column(row, "pesticide_name")?,
        recommended_dosage: column(row, "recommended_dosage")?,
        application_time: column(row, "application_time")?,
        operation_spec: column(row, "operation_spec")?,
    })
}

#[async_trait]
impl KnowledgeRepository for PgKnowledgeRepository {
    async fn insert_pest(&self, pest: NewPestInfo) -> DomainResult<PestInfo> {
        let sql = format!(
            "INSERT INTO pest_info (name, category, affected_part, symptom_description, peak_season, typical_image) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PEST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&pest.name)
            .bind(pest.category.as_str())
            .bind(&pest.affected_part)
            .bind(&pest.symptom_description)
            .bind(&pest.peak_season)
            .bind(&pest.typical_image)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        map_pest(&row)
    }

    async fn find_pest(&self, id: i64) -> DomainResult<Option<PestInfo>> {
        let sql = format!("SELECT {PEST_COLUMNS} FROM pest_info WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let pest = row.as_ref().map(map_pest).transpose()?;
        self.attach_one(pest).await
    }

    async fn list_pests(&self, page: Page) -> DomainResult<Vec<PestInfo>> {
        let sql = format!("SELECT {PEST_COLUMNS} FROM pest_info ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let pests = rows.iter().map(map_pest).collect::<DomainResult<Vec<_>>>()?;
        self.attach_schemes(pests).await
    }

    async fn update_pest(&self, id: i64, patch: PestInfoPatch) -> DomainResult<Option<PestInfo>> {
        let sql = format!(
            "UPDATE pest_info SET \
                name                = COALESCE($2, name), \
                category            = COALESCE($3, category), \
                affected_part       = COALESCE($4, affected_part), \
                symptom_description = COALESCE($5, symptom_description), \
                peak_season         = COALESCE($6, peak_season), \
                typical_image       = COALESCE($7, typical_image) \
             WHERE id = $1 RETURNING {PEST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(patch.category.map(|c| c.as_str()))
            .bind(&patch.affected_part)
            .bind(&patch.symptom_description)
            .bind(&patch.peak_season)
            .bind(&patch.typical_image)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let pest = row.as_ref().map(map_pest).transpose()?;
        self.attach_one(pest).await
    }

    /// Schemes go with it through `ON DELETE CASCADE`.
    async fn delete_pest(&self, id: i64) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM pest_info WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_scheme(&self, pest_id: i64, scheme: NewPreventionScheme) -> DomainResult<Option<PreventionScheme>> {
        // INSERT ... SELECT yields no row when the parent is missing.
        let sql = format!(
            "INSERT INTO prevention_schemes (pest_id, pesticide_name, recommended_dosage, application_time, operation_spec) \
             SELECT id, $2, $3, $4, $5 FROM pest_info WHERE id = $1 \
             RETURNING {SCHEME_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(pest_id)
            .bind(&scheme.pesticide_name)
            .bind(&scheme.recommended_dosage)
            .bind(&scheme.application_time)
            .bind(&scheme.operation_spec)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_scheme).transpose()
    }

    async fn delete_scheme(&self, id: i64) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM prevention_schemes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
