use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::notification::Notification;
use async_trait::async_trait;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<Notification>, DomainError>;
    async fn save_all(&self, notifications: &[Notification]) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvNotificationRepository {
    storage: Storage,
}

impl KvNotificationRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl NotificationRepository for KvNotificationRepository {
    async fn list(&self) -> Result<Vec<Notification>, DomainError> {
        Ok(self.storage.get(keys::NOTIFICATIONS, Vec::new()).await)
    }

    async fn save_all(&self, notifications: &[Notification]) -> Result<(), DomainError> {
        self.storage.set(keys::NOTIFICATIONS, notifications).await?;
        Ok(())
    }
}
