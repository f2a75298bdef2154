//! Pest knowledge base and prevention schemes.

use std::sync::Arc;

use domains::{KnowledgeRepository, NewPestInfo, NewPreventionScheme, Page, PestInfo, PestInfoPatch, PreventionScheme};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};

pub struct KnowledgeService {
    knowledge: Arc<dyn KnowledgeRepository>,
}

impl KnowledgeService {
    pub fn new(knowledge: Arc<dyn KnowledgeRepository>) -> Self {
        Self { knowledge }
    }

    pub async fn create_pest(&self, pest: NewPestInfo) -> ServiceResult<PestInfo> {
        let created = self.knowledge.insert_pest(pest).await?;
        info!(pest_id = created.id, name = %created.name, "pest entry created");
        Ok(created)
    }

    pub async fn list_pests(&self, page: Page) -> ServiceResult<Vec<PestInfo>> {
        Ok(self.knowledge.list_pests(page).await?)
    }

    pub async fn get_pest(&self, id: i64) -> ServiceResult<PestInfo> {
        self.knowledge
            .find_pest(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("pest entry", id))
    }

    pub async fn update_pest(&self, id: i64, patch: PestInfoPatch) -> ServiceResult<PestInfo> {
        let updated = self
            .knowledge
            .update_pest(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("pest entry", id))?;
        info!(pest_id = id, "pest entry updated");
        Ok(updated)
    }

    pub async fn delete_pest(&self, id: i64) -> ServiceResult<()> {
        if !self.knowledge.delete_pest(id).await? {
            return Err(ServiceError::not_found("pest entry", id));
        }
        info!(pest_id = id, "pest entry deleted");
        Ok(())
    }

    pub async fn add_scheme(&self, pest_id: i64, scheme: NewPreventionScheme) -> ServiceResult<PreventionScheme> {
        let created = self
            .knowledge
            .insert_scheme(pest_id, scheme)
            .await?
            .ok_or_else(|| ServiceError::not_found("pest entry", pest_id))?;
        info!(pest_id, scheme_id = created.id, "prevention scheme added");
        Ok(created)
    }

    pub async fn delete_scheme(&self, id: i64) -> ServiceResult<()> {
        if !self.knowledge.delete_scheme(id).await? {
            return Err(ServiceError::not_found("prevention scheme", id));
        }
        Ok(())
    }
}
