use std::collections::BTreeMap;

use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::reset_code::ResetCode;
use async_trait::async_trait;

/// Pending password resets keyed by lowercase e-mail.
#[async_trait]
pub trait ResetCodeRepository: Send + Sync {
    async fn find(&self, email: &str) -> Result<Option<ResetCode>, DomainError>;
    async fn put(&self, email: &str, code: ResetCode) -> Result<(), DomainError>;
    async fn remove(&self, email: &str) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvResetCodeRepository {
    storage: Storage,
}

impl KvResetCodeRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn load(&self) -> BTreeMap<String, ResetCode> {
        self.storage.get(keys::RESET_CODES, BTreeMap::new()).await
    }
}

#[async_trait]
impl ResetCodeRepository for KvResetCodeRepository {
    async fn find(&self, email: &str) -> Result<Option<ResetCode>, DomainError> {
        Ok(self.load().await.remove(email))
    }

    async fn put(&self, email: &str, code: ResetCode) -> Result<(), DomainError> {
        let mut codes = self.load().await;
        codes.insert(email.to_string(), code);
        self.storage.set(keys::RESET_CODES, &codes).await?;
        Ok(())
    }

    async fn remove(&self, email: &str) -> Result<(), DomainError> {
        let mut codes = self.load().await;
        if codes.remove(email).is_some() {
            self.storage.set(keys::RESET_CODES, &codes).await?;
        }
        Ok(())
    }
}
