use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::calculator::{CalculationForm, validate};
use crate::application::suggestion_service::SuggestionService;
use crate::data::quote_repository::QuoteRepository;
use crate::data::suggestion_repository::SuggestionRepository;
use crate::domain::error::DomainError;
use crate::domain::quote::{Quote, QuoteUpdate};
use crate::domain::wood::{ItemDetails, Totals, WoodItem, totals};
use crate::infrastructure::clock::Clock;

/// The pending wood list and the user's saved quotes.
#[derive(Clone)]
pub struct QuoteService<Q, S>
where
    Q: QuoteRepository + 'static,
    S: SuggestionRepository + 'static,
{
    repo: Arc<Q>,
    suggestions: SuggestionService<S>,
    clock: Arc<dyn Clock>,
}

impl<Q, S> QuoteService<Q, S>
where
    Q: QuoteRepository + 'static,
    S: SuggestionRepository + 'static,
{
    pub fn new(repo: Arc<Q>, suggestions: SuggestionService<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            suggestions,
            clock,
        }
    }

    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        details: ItemDetails,
        form: &CalculationForm,
    ) -> Result<WoodItem, DomainError> {
        let input = validate(form)?;
        let item = WoodItem::new(details, input, self.clock.now());

        let mut items = self.repo.current_items().await?;
        items.push(item.clone());
        self.repo.save_current_items(&items).await?;
        self.suggestions.record_item(&item.details).await?;

        info!(item_id = %item.id, items = items.len(), "item added");
        Ok(item)
    }

    /// Edit mode: recalculates the row in place, keeping its id.
    #[instrument(skip(self))]
    pub async fn replace_item(
        &self,
        index: usize,
        details: ItemDetails,
        form: &CalculationForm,
    ) -> Result<WoodItem, DomainError> {
        let input = validate(form)?;
        let mut items = self.repo.current_items().await?;
        let slot = items
            .get_mut(index)
            .ok_or(DomainError::ItemNotFound(index))?;
        slot.details = details;
        slot.input = input;
        let item = slot.clone();
        self.repo.save_current_items(&items).await?;
        self.suggestions.record_item(&item.details).await?;

        info!(item_id = %item.id, index, "item replaced");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, index: usize) -> Result<WoodItem, DomainError> {
        let mut items = self.repo.current_items().await?;
        if index >= items.len() {
            return Err(DomainError::ItemNotFound(index));
        }
        let removed = items.remove(index);
        self.repo.save_current_items(&items).await?;
        Ok(removed)
    }

    pub async fn current_items(&self) -> Result<Vec<WoodItem>, DomainError> {
        self.repo.current_items().await
    }

    #[instrument(skip(self))]
    pub async fn clear_items(&self) -> Result<(), DomainError> {
        self.repo.clear_current_items().await
    }

    pub async fn list_totals(&self) -> Result<Totals, DomainError> {
        Ok(totals(&self.repo.current_items().await?))
    }

    /// Turns the pending list into a quote and empties the list.
    #[instrument(skip(self))]
    pub async fn save_quote(&self, user_id: Uuid) -> Result<Quote, DomainError> {
        let items = self.repo.current_items().await?;
        if items.is_empty() {
            return Err(DomainError::EmptyWoodList);
        }
        let quote = self
            .repo
            .create(user_id, Quote::from_items(items, self.clock.now()))
            .await?;
        self.repo.clear_current_items().await?;
        Ok(quote)
    }

    pub async fn list_quotes(&self, user_id: Uuid) -> Result<Vec<Quote>, DomainError> {
        self.repo.list(user_id).await
    }

    pub async fn get_quote(&self, user_id: Uuid, id: Uuid) -> Result<Quote, DomainError> {
        self.repo
            .find_by_id(user_id, id)
            .await?
            .ok_or(DomainError::QuoteNotFound(id))
    }

    /// Accepts a full id, a quote number such as `ORÇ-1a2b3c`, or an id prefix.
    pub async fn resolve_reference(&self, user_id: Uuid, reference: &str) -> Result<Uuid, DomainError> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            return Ok(id);
        }
        let prefix = reference
            .strip_prefix("ORÇ-")
            .unwrap_or(reference)
            .replace('-', "")
            .to_lowercase();
        if prefix.is_empty() {
            return Err(DomainError::UnknownQuoteReference(reference.to_string()));
        }
        let matches: Vec<Uuid> = self
            .repo
            .list(user_id)
            .await?
            .into_iter()
            .map(|q| q.id)
            .filter(|id| id.simple().to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            _ => Err(DomainError::UnknownQuoteReference(reference.to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn update_quote(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: QuoteUpdate,
    ) -> Result<Option<Quote>, DomainError> {
        self.repo
            .update_quote(user_id, id, update, self.clock.now())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_quote(&self, user_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        self.repo.delete_quote(user_id, id).await
    }

    /// Copies a saved quote back into the pending list, replacing its contents.
    #[instrument(skip(self))]
    pub async fn load_quote_into_list(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<WoodItem>, DomainError> {
        let quote = self.get_quote(user_id, id).await?;
        self.repo.save_current_items(&quote.items).await?;
        info!(quote_id = %id, items = quote.items.len(), "quote loaded into list");
        Ok(quote.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::quote_repository::KvQuoteRepository;
    use crate::data::store::Storage;
    use crate::data::suggestion_repository::{KvSuggestionRepository, SuggestionList};
    use crate::infrastructure::clock::MockClock;

    type Service = QuoteService<KvQuoteRepository, KvSuggestionRepository>;

    fn service() -> (Service, SuggestionService<KvSuggestionRepository>) {
        let storage = Storage::in_memory();
        let suggestions = SuggestionService::new(Arc::new(KvSuggestionRepository::new(storage.clone())));
        let svc = QuoteService::new(
            Arc::new(KvQuoteRepository::new(storage)),
            suggestions.clone(),
            Arc::new(MockClock::default()),
        );
        (svc, suggestions)
    }

    fn form(quantity: &str) -> CalculationForm {
        CalculationForm {
            thickness: "5".into(),
            width: "10".into(),
            length: "300".into(),
            quantity: quantity.into(),
            package_quantity: String::new(),
            price: "1000".into(),
        }
    }

    fn details(client: &str) -> ItemDetails {
        ItemDetails {
            client_name: client.into(),
            species: "Cedro".into(),
            ..ItemDetails::default()
        }
    }

    #[tokio::test]
    async fn invalid_form_leaves_list_untouched() {
        let (svc, _) = service();
        let err = svc.add_item(details("A"), &form("0")).await.unwrap_err();
        assert!(matches!(err, DomainError::Calculation(_)));
        assert!(svc.current_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_item_feeds_suggestions() {
        let (svc, suggestions) = service();
        svc.add_item(details("Serraria Sul"), &form("2")).await.unwrap();
        assert_eq!(
            suggestions.suggest(SuggestionList::Species, "ced").await.unwrap(),
            vec!["Cedro"]
        );
        assert_eq!(
            suggestions.suggest(SuggestionList::Clients, "sul").await.unwrap(),
            vec!["Serraria Sul"]
        );
    }

    #[tokio::test]
    async fn replace_and_remove_by_index() {
        let (svc, _) = service();
        let first = svc.add_item(details("A"), &form("1")).await.unwrap();
        svc.add_item(details("A"), &form("1")).await.unwrap();

        let replaced = svc.replace_item(0, details("B"), &form("4")).await.unwrap();
        assert_eq!(replaced.id, first.id);
        assert_eq!(replaced.input.quantity, 4);

        assert!(matches!(svc.remove_item(5).await, Err(DomainError::ItemNotFound(5))));
        svc.remove_item(1).await.unwrap();
        let totals = svc.list_totals().await.unwrap();
        assert_eq!(totals.items, 1);
        assert!((totals.total_cost - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn save_quote_requires_items_and_clears_list() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        assert!(matches!(svc.save_quote(user).await, Err(DomainError::EmptyWoodList)));

        svc.add_item(details("Serraria Sul"), &form("2")).await.unwrap();
        let quote = svc.save_quote(user).await.unwrap();
        assert_eq!(quote.client_name, "Serraria Sul");
        assert!(svc.current_items().await.unwrap().is_empty());
        assert_eq!(svc.list_quotes(user).await.unwrap().len(), 1);
        assert!(svc.list_quotes(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quotes_resolve_by_number_or_prefix() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        svc.add_item(details("A"), &form("1")).await.unwrap();
        let quote = svc.save_quote(user).await.unwrap();

        assert_eq!(svc.resolve_reference(user, &quote.number()).await.unwrap(), quote.id);
        assert_eq!(svc.resolve_reference(user, &quote.id.to_string()).await.unwrap(), quote.id);
        assert!(matches!(
            svc.resolve_reference(user, "ORÇ-").await,
            Err(DomainError::UnknownQuoteReference(_))
        ));
    }

    #[tokio::test]
    async fn missing_quote_is_reported_without_writes() {
        let (svc, _) = service();
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        assert!(svc.update_quote(user, id, QuoteUpdate::default()).await.unwrap().is_none());
        assert!(!svc.delete_quote(user, id).await.unwrap());
        assert!(matches!(svc.get_quote(user, id).await, Err(DomainError::QuoteNotFound(_))));
    }
}
