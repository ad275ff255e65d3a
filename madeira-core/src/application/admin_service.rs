use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::data::plan_request_repository::PlanRequestRepository;
use crate::data::reset_code_repository::ResetCodeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::plan::PlanKind;
use crate::domain::plan_request::{PlanRequest, RequestStatus};
use crate::infrastructure::clock::Clock;

pub const ADMIN_SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: usize,
    pub active_plans: usize,
    pub paid_plans: usize,
    pub pending_requests: usize,
}

/// Plan upgrade requests and the password-guarded review screen.
#[derive(Clone)]
pub struct AdminService<R, U, C>
where
    R: PlanRequestRepository + 'static,
    U: UserRepository + 'static,
    C: ResetCodeRepository + 'static,
{
    requests: Arc<R>,
    users: Arc<U>,
    auth: AuthService<U, C>,
    admin_password: Option<String>,
    clock: Arc<dyn Clock>,
}

impl<R, U, C> AdminService<R, U, C>
where
    R: PlanRequestRepository + 'static,
    U: UserRepository + 'static,
    C: ResetCodeRepository + 'static,
{
    pub fn new(
        requests: Arc<R>,
        users: Arc<U>,
        auth: AuthService<U, C>,
        admin_password: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            users,
            auth,
            admin_password,
            clock,
        }
    }

    /// Paid plans only; the free trial needs no review.
    #[instrument(skip(self))]
    pub async fn request_plan(&self, user_id: Uuid, plan_key: &str) -> Result<PlanRequest, DomainError> {
        let plan: PlanKind = plan_key.parse()?;
        if plan == PlanKind::Free {
            return Err(DomainError::InvalidPlan(plan_key.to_string()));
        }
        let user = self.auth.get_user(user_id).await?;
        self.requests
            .create(PlanRequest::new(user.id, user.name, plan, self.clock.now()))
            .await
    }

    #[instrument(skip(self, password))]
    pub async fn unlock(&self, password: &str) -> Result<(), DomainError> {
        let expected = self
            .admin_password
            .as_deref()
            .ok_or(DomainError::AdminDisabled)?;
        if password != expected {
            warn!("wrong admin password");
            return Err(DomainError::Forbidden);
        }
        self.requests
            .set_last_admin_access(Some(self.clock.now()))
            .await?;
        info!("admin session opened");
        Ok(())
    }

    pub async fn lock(&self) -> Result<(), DomainError> {
        self.requests.set_last_admin_access(None).await
    }

    /// Sessions lapse lazily 24 hours after the last unlock.
    pub async fn ensure_session(&self) -> Result<(), DomainError> {
        if self.admin_password.is_none() {
            return Err(DomainError::AdminDisabled);
        }
        let Some(opened) = self.requests.last_admin_access().await? else {
            return Err(DomainError::Forbidden);
        };
        if self.clock.now() - opened > Duration::hours(ADMIN_SESSION_HOURS) {
            self.requests.set_last_admin_access(None).await?;
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }

    pub async fn pending(&self) -> Result<Vec<PlanRequest>, DomainError> {
        self.ensure_session().await?;
        Ok(self
            .requests
            .list()
            .await?
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, request_id: Uuid) -> Result<PlanRequest, DomainError> {
        self.ensure_session().await?;
        let mut request = self.pending_request(request_id).await?;
        self.auth
            .update_plan(request.user_id, &request.plan.to_string())
            .await?;
        request.status = RequestStatus::Approved;
        request.decided_at = Some(self.clock.now());
        self.requests.update(&request).await?;
        info!(request_id = %request_id, user_id = %request.user_id, "plan request approved");
        Ok(request)
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, request_id: Uuid) -> Result<PlanRequest, DomainError> {
        self.ensure_session().await?;
        let mut request = self.pending_request(request_id).await?;
        request.status = RequestStatus::Rejected;
        request.decided_at = Some(self.clock.now());
        self.requests.update(&request).await?;
        info!(request_id = %request_id, "plan request rejected");
        Ok(request)
    }

    pub async fn stats(&self) -> Result<AdminStats, DomainError> {
        self.ensure_session().await?;
        let now = self.clock.now();
        let users = self.users.list().await?;
        let pending_requests = self
            .requests
            .list()
            .await?
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count();
        Ok(AdminStats {
            users: users.len(),
            active_plans: users.iter().filter(|u| u.plan.is_active(now)).count(),
            paid_plans: users
                .iter()
                .filter(|u| matches!(u.plan.kind, PlanKind::Monthly | PlanKind::Yearly))
                .count(),
            pending_requests,
        })
    }

    async fn pending_request(&self, request_id: Uuid) -> Result<PlanRequest, DomainError> {
        let request = self
            .requests
            .list()
            .await?
            .into_iter()
            .find(|r| r.id == request_id)
            .ok_or(DomainError::PlanRequestNotFound(request_id))?;
        if request.status != RequestStatus::Pending {
            return Err(DomainError::Validation(format!(
                "request {request_id} was already {}",
                request.status
            )));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plan_request_repository::KvPlanRequestRepository;
    use crate::data::reset_code_repository::KvResetCodeRepository;
    use crate::data::store::Storage;
    use crate::data::user_repository::KvUserRepository;
    use crate::infrastructure::clock::MockClock;

    type Admin = AdminService<KvPlanRequestRepository, KvUserRepository, KvResetCodeRepository>;

    fn setup(password: Option<&str>) -> (Admin, AuthService<KvUserRepository, KvResetCodeRepository>, MockClock) {
        let storage = Storage::in_memory();
        let clock = MockClock::default();
        let users = Arc::new(KvUserRepository::new(storage.clone()));
        let auth = AuthService::new(
            users.clone(),
            Arc::new(KvResetCodeRepository::new(storage.clone())),
            Arc::new(clock.clone()),
        );
        let admin = AdminService::new(
            Arc::new(KvPlanRequestRepository::new(storage)),
            users,
            auth.clone(),
            password.map(str::to_string),
            Arc::new(clock.clone()),
        );
        (admin, auth, clock)
    }

    #[tokio::test]
    async fn admin_surface_is_disabled_without_password() {
        let (admin, _, _) = setup(None);
        assert!(matches!(admin.unlock("x").await, Err(DomainError::AdminDisabled)));
        assert!(matches!(admin.pending().await, Err(DomainError::AdminDisabled)));
    }

    #[tokio::test]
    async fn session_expires_after_a_day() {
        let (admin, _, clock) = setup(Some("root"));
        assert!(matches!(admin.unlock("nope").await, Err(DomainError::Forbidden)));
        assert!(matches!(admin.ensure_session().await, Err(DomainError::Forbidden)));

        admin.unlock("root").await.unwrap();
        clock.advance(Duration::hours(ADMIN_SESSION_HOURS));
        admin.ensure_session().await.unwrap();
        clock.advance(Duration::seconds(1));
        assert!(matches!(admin.ensure_session().await, Err(DomainError::Forbidden)));
    }

    #[tokio::test]
    async fn approving_a_request_moves_the_user_to_the_plan() {
        let (admin, auth, clock) = setup(Some("root"));
        let user = auth
            .register("ana@serraria.com".into(), "segredo".into(), "Ana".into())
            .await
            .unwrap();
        assert!(matches!(
            admin.request_plan(user.id, "free").await,
            Err(DomainError::InvalidPlan(_))
        ));
        let request = admin.request_plan(user.id, "monthly").await.unwrap();
        assert_eq!(request.price, 10.0);

        admin.unlock("root").await.unwrap();
        assert_eq!(admin.pending().await.unwrap().len(), 1);
        let approved = admin.approve(request.id).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(admin.pending().await.unwrap().is_empty());
        assert!(matches!(admin.reject(request.id).await, Err(DomainError::Validation(_))));

        let user = auth.get_user(user.id).await.unwrap();
        assert_eq!(user.plan.kind, PlanKind::Monthly);
        assert_eq!(user.plan.start_date, Some(clock.now()));

        let stats = admin.stats().await.unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.paid_plans, 1);
        assert_eq!(stats.pending_requests, 0);
    }
}
