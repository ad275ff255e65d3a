use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::profile_repository::ProfileRepository;
use crate::domain::error::DomainError;
use crate::domain::settings::Settings;

#[derive(Clone)]
pub struct SettingsService<P: ProfileRepository + 'static> {
    repo: Arc<P>,
}

impl<P> SettingsService<P>
where
    P: ProfileRepository + 'static,
{
    pub fn new(repo: Arc<P>) -> Self {
        Self { repo }
    }

    pub async fn get(&self) -> Result<Settings, DomainError> {
        self.repo.settings().await
    }

    #[instrument(skip(self))]
    pub async fn set(&self, key: &str, value: &str) -> Result<Settings, DomainError> {
        let mut settings = self.repo.settings().await?;
        settings.set(key, value)?;
        self.repo.save_settings(&settings).await?;
        info!(key, "setting changed");
        Ok(settings)
    }

    pub async fn reset(&self) -> Result<Settings, DomainError> {
        self.repo.reset_settings().await?;
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::profile_repository::KvProfileRepository;
    use crate::data::store::Storage;

    #[tokio::test]
    async fn set_persists_and_reset_restores_defaults() {
        let svc = SettingsService::new(Arc::new(KvProfileRepository::new(Storage::in_memory())));
        svc.set("darkMode", "true").await.unwrap();
        assert!(svc.get().await.unwrap().dark_mode);

        assert!(svc.set("backupFrequency", "hourly").await.is_err());
        assert_eq!(svc.get().await.unwrap().backup_frequency, "daily");

        svc.reset().await.unwrap();
        assert_eq!(svc.get().await.unwrap(), Settings::default());
    }
}
