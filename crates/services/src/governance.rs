//! Governance records: farmer-owned pest/disease reports.

use std::sync::Arc;

use domains::{GovernanceRecord, GovernanceRecordPatch, GovernanceRepository, NewGovernanceRecord, Page, User};
use tracing::info;

use crate::access::{authorize, ensure_owner_or_admin, roles};
use crate::error::{ServiceError, ServiceResult};

pub struct GovernanceService {
    records: Arc<dyn GovernanceRepository>,
}

impl GovernanceService {
    pub fn new(records: Arc<dyn GovernanceRepository>) -> Self {
        Self { records }
    }

    pub async fn create(&self, owner: &User, record: NewGovernanceRecord) -> ServiceResult<GovernanceRecord> {
        let created = self.records.insert(owner.id, record).await?;
        info!(record_id = created.id, owner_id = owner.id, "governance record created");
        Ok(created)
    }

    pub async fn list_mine(&self, owner: &User, page: Page) -> ServiceResult<Vec<GovernanceRecord>> {
        Ok(self.records.list_by_owner(owner.id, page).await?)
    }

    pub async fn list_all(&self, page: Page) -> ServiceResult<Vec<GovernanceRecord>> {
        Ok(self.records.list_all(page).await?)
    }

    /// Readable by the owner and by experts/admins.
    pub async fn get(&self, viewer: &User, id: i64) -> ServiceResult<GovernanceRecord> {
        let record = self.load(id).await?;
        if record.user_id != viewer.id {
            authorize(viewer, roles::EXPERT_OR_ADMIN)?;
        }
        Ok(record)
    }

    pub async fn update(&self, actor: &User, id: i64, patch: GovernanceRecordPatch) -> ServiceResult<GovernanceRecord> {
        let record = self.load(id).await?;
        ensure_owner_or_admin(actor, record.user_id)?;

        let updated = self
            .records
            .update(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("governance record", id))?;
        info!(record_id = id, actor_id = actor.id, status = %updated.status, "governance record updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: i64) -> ServiceResult<()> {
        let record = self.load(id).await?;
        ensure_owner_or_admin(actor, record.user_id)?;

        if !self.records.delete(id).await? {
            return Err(ServiceError::not_found("governance record", id));
        }
        info!(record_id = id, actor_id = actor.id, "governance record deleted");
        Ok(())
    }

    async fn load(&self, id: i64) -> ServiceResult<GovernanceRecord> {
        self.records
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("governance record", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{GovernanceStatus, MockGovernanceRepository, Role};

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            email: format!("u{id}@x.com"),
            username: format!("u{id}"),
            password_hash: String::new(),
            role,
            phone: None,
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    fn record(id: i64, owner: i64) -> GovernanceRecord {
        GovernanceRecord {
            id,
            user_id: owner,
            pest_type: "fire blight".into(),
            found_time: Utc::now(),
            location: None,
            status: GovernanceStatus::InProgress,
            description: None,
            photos: vec![],
        }
    }

    fn repo_with_record_owned_by(owner: i64) -> MockGovernanceRepository {
        let mut repo = MockGovernanceRepository::new();
        repo.expect_find().returning(move |id| Ok(Some(record(id, owner))));
        repo
    }

    #[tokio::test]
    async fn non_owner_farmer_cannot_update_or_delete() {
        let mut repo = repo_with_record_owned_by(10);
        repo.expect_update().never();
        repo.expect_delete().never();
        let service = GovernanceService::new(Arc::new(repo));
        let intruder = user(11, Role::Farmer);

        let err = service.update(&intruder, 1, GovernanceRecordPatch::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = service.delete(&intruder, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn expert_is_not_an_owner_substitute() {
        let mut repo = repo_with_record_owned_by(10);
        repo.expect_delete().never();
        let service = GovernanceService::new(Arc::new(repo));

        let err = service.delete(&user(12, Role::Expert), 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn owner_and_admin_may_mutate() {
        let mut repo = repo_with_record_owned_by(10);
        repo.expect_update().returning(|id, patch| {
            let mut r = record(id, 10);
            patch.apply_to(&mut r);
            Ok(Some(r))
        });
        repo.expect_delete().returning(|_| Ok(true));
        let service = GovernanceService::new(Arc::new(repo));

        let patch = GovernanceRecordPatch { status: Some(GovernanceStatus::Completed), ..Default::default() };
        let updated = service.update(&user(10, Role::Farmer), 1, patch).await.unwrap();
        assert_eq!(updated.status, GovernanceStatus::Completed);
        service.delete(&user(1, Role::Admin), 1).await.unwrap();
    }

    #[tokio::test]
    async fn missing_record_is_not_found_before_ownership() {
        let mut repo = MockGovernanceRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        let service = GovernanceService::new(Arc::new(repo));

        let err = service.delete(&user(11, Role::Farmer), 77).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("governance record 77".into()));
    }

    #[tokio::test]
    async fn experts_may_read_others_records_farmers_may_not() {
        let service = GovernanceService::new(Arc::new(repo_with_record_owned_by(10)));
        assert!(service.get(&user(12, Role::Expert), 1).await.is_ok());
        assert!(service.get(&user(10, Role::Farmer), 1).await.is_ok());
        assert!(matches!(
            service.get(&user(11, Role::Farmer), 1).await,
            Err(ServiceError::Forbidden(_))
        ));
    }
}
