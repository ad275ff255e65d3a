use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::user::User;
use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn update(&self, user: &User) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn current_user_id(&self) -> Result<Option<Uuid>, DomainError>;
    async fn set_current_user_id(&self, id: Option<Uuid>) -> Result<(), DomainError>;
}

/// Users live as one array under a single key.
#[derive(Clone)]
pub struct KvUserRepository {
    storage: Storage,
}

impl KvUserRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn load(&self) -> Vec<User> {
        self.storage.get(keys::USERS, Vec::new()).await
    }

    async fn save(&self, users: &[User]) -> Result<(), DomainError> {
        self.storage.set(keys::USERS, users).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for KvUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.load().await;
        if users.iter().any(|u| u.email == user.email) {
            warn!(email = %user.email, "email already registered");
            return Err(DomainError::UserAlreadyExists(user.email));
        }
        users.push(user.clone());
        self.save(&users).await?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.load().await.into_iter().find(|u| u.email == email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.load().await.into_iter().find(|u| u.id == id))
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.load().await;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(DomainError::UserNotFound(user.id))?;
        *slot = user.clone();
        self.save(&users).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut users = self.load().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }
        self.save(&users).await?;
        info!(user_id = %id, "user deleted");
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.load().await)
    }

    async fn current_user_id(&self) -> Result<Option<Uuid>, DomainError> {
        Ok(self.storage.try_get(keys::CURRENT_USER_ID).await)
    }

    async fn set_current_user_id(&self, id: Option<Uuid>) -> Result<(), DomainError> {
        match id {
            Some(id) => self.storage.set(keys::CURRENT_USER_ID, &id).await?,
            None => self.storage.remove(keys::CURRENT_USER_ID).await?,
        }
        Ok(())
    }
}
