use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::plan_request::PlanRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait PlanRequestRepository: Send + Sync {
    async fn create(&self, request: PlanRequest) -> Result<PlanRequest, DomainError>;
    async fn list(&self) -> Result<Vec<PlanRequest>, DomainError>;
    async fn update(&self, request: &PlanRequest) -> Result<(), DomainError>;
    async fn delete_for_user(&self, user_id: Uuid) -> Result<usize, DomainError>;
    async fn last_admin_access(&self) -> Result<Option<DateTime<Utc>>, DomainError>;
    async fn set_last_admin_access(&self, at: Option<DateTime<Utc>>) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvPlanRequestRepository {
    storage: Storage,
}

impl KvPlanRequestRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn load(&self) -> Vec<PlanRequest> {
        self.storage.get(keys::PLAN_REQUESTS, Vec::new()).await
    }
}

#[async_trait]
impl PlanRequestRepository for KvPlanRequestRepository {
    async fn create(&self, request: PlanRequest) -> Result<PlanRequest, DomainError> {
        let mut requests = self.load().await;
        requests.push(request.clone());
        self.storage.set(keys::PLAN_REQUESTS, &requests).await?;

        info!(request_id = %request.id, user_id = %request.user_id, plan = %request.plan, "plan request created");
        Ok(request)
    }

    async fn list(&self) -> Result<Vec<PlanRequest>, DomainError> {
        Ok(self.load().await)
    }

    async fn update(&self, request: &PlanRequest) -> Result<(), DomainError> {
        let mut requests = self.load().await;
        let slot = requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(DomainError::PlanRequestNotFound(request.id))?;
        *slot = request.clone();
        self.storage.set(keys::PLAN_REQUESTS, &requests).await?;
        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut requests = self.load().await;
        let before = requests.len();
        requests.retain(|r| r.user_id != user_id);
        let removed = before - requests.len();
        if removed > 0 {
            self.storage.set(keys::PLAN_REQUESTS, &requests).await?;
        }
        Ok(removed)
    }

    async fn last_admin_access(&self) -> Result<Option<DateTime<Utc>>, DomainError> {
        Ok(self.storage.try_get(keys::ADMIN_ACCESS).await)
    }

    async fn set_last_admin_access(&self, at: Option<DateTime<Utc>>) -> Result<(), DomainError> {
        match at {
            Some(at) => self.storage.set(keys::ADMIN_ACCESS, &at).await?,
            None => self.storage.remove(keys::ADMIN_ACCESS).await?,
        }
        Ok(())
    }
}
