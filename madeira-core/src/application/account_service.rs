use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::plan_request_repository::PlanRequestRepository;
use crate::data::profile_repository::ProfileRepository;
use crate::data::quote_repository::QuoteRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::profile::CompanyProfile;
use crate::domain::quote::Quote;
use crate::domain::settings::Settings;
use crate::domain::user::UserView;
use crate::domain::wood::WoodItem;
use crate::infrastructure::clock::Clock;

pub const EXPORT_FORMAT_VERSION: &str = "2.0.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountExport {
    pub user: UserView,
    pub profile: CompanyProfile,
    pub quotes: Vec<Quote>,
    pub current_list: Vec<WoodItem>,
    pub settings: Settings,
    pub version: &'static str,
    pub exported_at: DateTime<Utc>,
}

/// Whole-account operations that span several repositories.
#[derive(Clone)]
pub struct AccountService<U, Q, P, R>
where
    U: UserRepository + 'static,
    Q: QuoteRepository + 'static,
    P: ProfileRepository + 'static,
    R: PlanRequestRepository + 'static,
{
    users: Arc<U>,
    quotes: Arc<Q>,
    profiles: Arc<P>,
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, Q, P, R> AccountService<U, Q, P, R>
where
    U: UserRepository + 'static,
    Q: QuoteRepository + 'static,
    P: ProfileRepository + 'static,
    R: PlanRequestRepository + 'static,
{
    pub fn new(
        users: Arc<U>,
        quotes: Arc<Q>,
        profiles: Arc<P>,
        requests: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            quotes,
            profiles,
            requests,
            clock,
        }
    }

    pub async fn export_account(&self, user_id: Uuid) -> Result<AccountExport, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;
        Ok(AccountExport {
            user: UserView::from(&user),
            profile: self.profiles.profile(user_id).await?.unwrap_or_default(),
            quotes: self.quotes.list(user_id).await?,
            current_list: self.quotes.current_items().await?,
            settings: self.profiles.settings().await?,
            version: EXPORT_FORMAT_VERSION,
            exported_at: self.clock.now(),
        })
    }

    /// Removes the user with its quotes, profile and plan requests.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), DomainError> {
        if !self.users.delete(user_id).await? {
            return Err(DomainError::UserNotFound(user_id));
        }
        self.quotes.delete_all(user_id).await?;
        self.profiles.delete_profile(user_id).await?;
        let requests = self.requests.delete_for_user(user_id).await?;
        if self.users.current_user_id().await? == Some(user_id) {
            self.users.set_current_user_id(None).await?;
        }
        info!(user_id = %user_id, requests, "account deleted");
        Ok(())
    }
}
