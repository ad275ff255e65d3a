use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::profile::CompanyProfile;
use crate::domain::settings::Settings;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn profile(&self, user_id: Uuid) -> Result<Option<CompanyProfile>, DomainError>;
    async fn save_profile(&self, user_id: Uuid, profile: &CompanyProfile) -> Result<(), DomainError>;
    async fn delete_profile(&self, user_id: Uuid) -> Result<(), DomainError>;
    async fn settings(&self) -> Result<Settings, DomainError>;
    async fn save_settings(&self, settings: &Settings) -> Result<(), DomainError>;
    async fn reset_settings(&self) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvProfileRepository {
    storage: Storage,
}

impl KvProfileRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ProfileRepository for KvProfileRepository {
    async fn profile(&self, user_id: Uuid) -> Result<Option<CompanyProfile>, DomainError> {
        Ok(self.storage.try_get(&keys::profile(user_id)).await)
    }

    async fn save_profile(&self, user_id: Uuid, profile: &CompanyProfile) -> Result<(), DomainError> {
        self.storage.set(&keys::profile(user_id), profile).await?;
        info!(user_id = %user_id, "profile saved");
        Ok(())
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.storage.remove(&keys::profile(user_id)).await?;
        Ok(())
    }

    async fn settings(&self) -> Result<Settings, DomainError> {
        Ok(self.storage.get(keys::SETTINGS, Settings::default()).await)
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), DomainError> {
        self.storage.set(keys::SETTINGS, settings).await?;
        Ok(())
    }

    async fn reset_settings(&self) -> Result<(), DomainError> {
        self.storage.remove(keys::SETTINGS).await?;
        info!("settings reset to defaults");
        Ok(())
    }
}
