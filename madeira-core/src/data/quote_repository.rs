use crate::data::keys;
use crate::data::store::Storage;
use crate::domain::error::DomainError;
use crate::domain::quote::{Quote, QuoteUpdate};
use crate::domain::wood::WoodItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// The pending list is global, not per user.
    async fn current_items(&self) -> Result<Vec<WoodItem>, DomainError>;
    async fn save_current_items(&self, items: &[WoodItem]) -> Result<(), DomainError>;
    async fn clear_current_items(&self) -> Result<(), DomainError>;

    async fn create(&self, user_id: Uuid, quote: Quote) -> Result<Quote, DomainError>;
    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Quote>, DomainError>;
    async fn list(&self, user_id: Uuid) -> Result<Vec<Quote>, DomainError>;
    async fn update_quote(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: QuoteUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Quote>, DomainError>;
    async fn delete_quote(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
    async fn delete_all(&self, user_id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct KvQuoteRepository {
    storage: Storage,
}

impl KvQuoteRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn load(&self, user_id: Uuid) -> Vec<Quote> {
        self.storage.get(&keys::quotes(user_id), Vec::new()).await
    }

    async fn save(&self, user_id: Uuid, quotes: &[Quote]) -> Result<(), DomainError> {
        self.storage.set(&keys::quotes(user_id), quotes).await?;
        Ok(())
    }
}

#[async_trait]
impl QuoteRepository for KvQuoteRepository {
    async fn current_items(&self) -> Result<Vec<WoodItem>, DomainError> {
        Ok(self.storage.get(keys::WOOD_LIST, Vec::new()).await)
    }

    async fn save_current_items(&self, items: &[WoodItem]) -> Result<(), DomainError> {
        self.storage.set(keys::WOOD_LIST, items).await?;
        Ok(())
    }

    async fn clear_current_items(&self) -> Result<(), DomainError> {
        self.storage.remove(keys::WOOD_LIST).await?;
        Ok(())
    }

    async fn create(&self, user_id: Uuid, quote: Quote) -> Result<Quote, DomainError> {
        let mut quotes = self.load(user_id).await;
        quotes.push(quote.clone());
        self.save(user_id, &quotes).await?;

        info!(quote_id = %quote.id, user_id = %user_id, items = quote.items.len(), "quote created");
        Ok(quote)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<Quote>, DomainError> {
        Ok(self.load(user_id).await.into_iter().find(|q| q.id == id))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Quote>, DomainError> {
        Ok(self.load(user_id).await)
    }

    async fn update_quote(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: QuoteUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Quote>, DomainError> {
        let mut quotes = self.load(user_id).await;
        let Some(quote) = quotes.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        update.apply(quote, now);
        let updated = quote.clone();
        self.save(user_id, &quotes).await?;

        info!(quote_id = %id, "quote updated");
        Ok(Some(updated))
    }

    async fn delete_quote(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let mut quotes = self.load(user_id).await;
        let before = quotes.len();
        quotes.retain(|q| q.id != id);
        if quotes.len() == before {
            return Ok(false);
        }
        self.save(user_id, &quotes).await?;

        info!(quote_id = %id, "quote deleted");
        Ok(true)
    }

    async fn delete_all(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.storage.remove(&keys::quotes(user_id)).await?;
        Ok(())
    }
}
