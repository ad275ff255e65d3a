use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::notification_repository::NotificationRepository;
use crate::domain::error::DomainError;
use crate::domain::notification::{Notification, NotificationFilter, NotificationKind};
use crate::infrastructure::clock::Clock;

#[derive(Clone)]
pub struct NotificationService<N: NotificationRepository + 'static> {
    repo: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N> NotificationService<N>
where
    N: NotificationRepository + 'static,
{
    pub fn new(repo: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    #[instrument(skip(self, message))]
    pub async fn add(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Notification, DomainError> {
        let notification =
            Notification::new(kind, title.to_string(), message.to_string(), self.clock.now());
        let mut all = self.repo.list().await?;
        all.insert(0, notification.clone());
        self.repo.save_all(&all).await?;
        debug!(id = %notification.id, "notification added");
        Ok(notification)
    }

    pub async fn list(&self, filter: NotificationFilter) -> Result<Vec<Notification>, DomainError> {
        Ok(self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|n| filter.matches(n))
            .collect())
    }

    pub async fn unread_count(&self) -> Result<usize, DomainError> {
        Ok(self.repo.list().await?.iter().filter(|n| !n.read).count())
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<(), DomainError> {
        let mut all = self.repo.list().await?;
        let target = all
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(DomainError::NotificationNotFound(id))?;
        if !target.read {
            target.read = true;
            self.repo.save_all(&all).await?;
        }
        Ok(())
    }

    /// Returns how many were unread.
    pub async fn mark_all_read(&self) -> Result<usize, DomainError> {
        let mut all = self.repo.list().await?;
        let mut changed = 0;
        for n in all.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.repo.save_all(&all).await?;
        }
        Ok(changed)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut all = self.repo.list().await?;
        let before = all.len();
        all.retain(|n| n.id != id);
        if all.len() == before {
            return Err(DomainError::NotificationNotFound(id));
        }
        self.repo.save_all(&all).await
    }
}
