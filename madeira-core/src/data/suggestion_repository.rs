use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::profile::ClientContact;
use async_trait::async_trait;

/// Plain string lists remembered for autocomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionList {
    Clients,
    Species,
    PaymentTerms,
}

impl SuggestionList {
    fn key(self) -> &'static str {
        match self {
            SuggestionList::Clients => keys::CLIENTS,
            SuggestionList::Species => keys::SPECIES,
            SuggestionList::PaymentTerms => keys::PAYMENT_TERMS,
        }
    }
}

#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// `None` when the list was never written.
    async fn list(&self, list: SuggestionList) -> Result<Option<Vec<String>>, DomainError>;
    async fn save_list(&self, list: SuggestionList, values: &[String]) -> Result<(), DomainError>;
    async fn contacts(&self) -> Result<Vec<ClientContact>, DomainError>;
    async fn save_contacts(&self, contacts: &[ClientContact]) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvSuggestionRepository {
    storage: Storage,
}

impl KvSuggestionRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SuggestionRepository for KvSuggestionRepository {
    async fn list(&self, list: SuggestionList) -> Result<Option<Vec<String>>, DomainError> {
        Ok(self.storage.try_get(list.key()).await)
    }

    async fn save_list(&self, list: SuggestionList, values: &[String]) -> Result<(), DomainError> {
        self.storage.set(list.key(), values).await?;
        Ok(())
    }

    async fn contacts(&self) -> Result<Vec<ClientContact>, DomainError> {
        Ok(self.storage.get(keys::CLIENTS_WITH_PHONE, Vec::new()).await)
    }

    async fn save_contacts(&self, contacts: &[ClientContact]) -> Result<(), DomainError> {
        self.storage.set(keys::CLIENTS_WITH_PHONE, contacts).await?;
        Ok(())
    }
}
