use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::data::suggestion_repository::{SuggestionList, SuggestionRepository};
use crate::domain::error::DomainError;
use crate::domain::profile::ClientContact;
use crate::domain::wood::ItemDetails;
use crate::presentation::format::format_phone;

pub const MAX_SUGGESTIONS: usize = 5;
pub const PAYMENT_TERM_MIN_CHARS: usize = 3;
pub const PAYMENT_TERM_MAX_CHARS: usize = 100;

pub const DEFAULT_PAYMENT_TERMS: [&str; 12] = [
    "50% entrada, 50% na entrega",
    "À vista",
    "30% entrada, 70% na entrega",
    "Pagamento na entrega",
    "1+2 (33% entrada, 33% em 30 dias, 34% em 60 dias)",
    "1+3 (25% entrada, 25% em 30 dias, 25% em 60 dias, 25% em 90 dias)",
    "Parcelado em 2x sem juros",
    "Parcelado em 3x sem juros",
    "70% entrada, 30% na entrega",
    "Pagamento em 30 dias",
    "Pagamento em 45 dias",
    "Pagamento em 60 dias",
];

pub fn is_default_term(term: &str) -> bool {
    DEFAULT_PAYMENT_TERMS.contains(&term)
}

/// Autocomplete memory plus the editable payment-term catalog.
#[derive(Clone)]
pub struct SuggestionService<S: SuggestionRepository + 'static> {
    repo: Arc<S>,
}

impl<S> SuggestionService<S>
where
    S: SuggestionRepository + 'static,
{
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }

    /// Case-insensitive substring match, at most five hits.
    pub async fn suggest(&self, list: SuggestionList, term: &str) -> Result<Vec<String>, DomainError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let values = match list {
            SuggestionList::PaymentTerms => self.payment_terms().await?,
            other => self.repo.list(other).await?.unwrap_or_default(),
        };
        Ok(values
            .into_iter()
            .filter(|v| v.to_lowercase().contains(&term))
            .take(MAX_SUGGESTIONS)
            .collect())
    }

    pub async fn contact_for(&self, name: &str) -> Result<Option<ClientContact>, DomainError> {
        let name = name.trim();
        Ok(self
            .repo
            .contacts()
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    /// Remembers the free-text fields of a calculated item.
    pub async fn record_item(&self, details: &ItemDetails) -> Result<(), DomainError> {
        self.remember(SuggestionList::Clients, &details.client_name).await?;
        self.remember(SuggestionList::Species, &details.species).await?;
        if !details.client_name.trim().is_empty() {
            self.upsert_contact(&details.client_name, &details.client_contact)
                .await?;
        }
        let term = details.payment_terms.trim();
        if valid_term_length(term) && !self.payment_terms().await?.iter().any(|t| t == term) {
            self.add_payment_term(term).await?;
        }
        Ok(())
    }

    pub async fn remember(&self, list: SuggestionList, value: &str) -> Result<bool, DomainError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(false);
        }
        let mut values = self.repo.list(list).await?.unwrap_or_default();
        if values.iter().any(|v| v == value) {
            return Ok(false);
        }
        values.push(value.to_string());
        self.repo.save_list(list, &values).await?;
        Ok(true)
    }

    /// Keeps one contact per name; a new phone replaces the old one.
    pub async fn upsert_contact(&self, name: &str, phone: &str) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let phone = format_phone(phone);
        let mut contacts = self.repo.contacts().await?;
        match contacts.iter_mut().find(|c| c.name == name) {
            Some(existing) if phone.is_empty() || existing.phone == phone => return Ok(()),
            Some(existing) => existing.phone = phone,
            None => contacts.push(ClientContact {
                name: name.to_string(),
                phone,
            }),
        }
        self.repo.save_contacts(&contacts).await
    }

    /// Stored terms, seeded with the defaults the first time.
    pub async fn payment_terms(&self) -> Result<Vec<String>, DomainError> {
        match self.repo.list(SuggestionList::PaymentTerms).await? {
            Some(terms) if !terms.is_empty() => Ok(terms),
            _ => {
                let defaults: Vec<String> =
                    DEFAULT_PAYMENT_TERMS.iter().map(|t| t.to_string()).collect();
                self.repo
                    .save_list(SuggestionList::PaymentTerms, &defaults)
                    .await?;
                info!("default payment terms seeded");
                Ok(defaults)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn add_payment_term(&self, term: &str) -> Result<Vec<String>, DomainError> {
        let term = validate_term(term)?;
        let mut terms = self.payment_terms().await?;
        ensure_unique(&terms, &term, None)?;
        terms.push(term);
        self.repo
            .save_list(SuggestionList::PaymentTerms, &terms)
            .await?;
        Ok(terms)
    }

    #[instrument(skip(self))]
    pub async fn edit_payment_term(&self, index: usize, term: &str) -> Result<Vec<String>, DomainError> {
        let term = validate_term(term)?;
        let mut terms = self.payment_terms().await?;
        let current = terms
            .get(index)
            .ok_or(DomainError::PaymentTermNotFound(index))?;
        if is_default_term(current) {
            warn!(index, "attempt to edit a default payment term");
            return Err(DomainError::ProtectedPaymentTerm);
        }
        ensure_unique(&terms, &term, Some(index))?;
        terms[index] = term;
        self.repo
            .save_list(SuggestionList::PaymentTerms, &terms)
            .await?;
        Ok(terms)
    }

    #[instrument(skip(self))]
    pub async fn delete_payment_term(&self, index: usize) -> Result<String, DomainError> {
        let mut terms = self.payment_terms().await?;
        let current = terms
            .get(index)
            .ok_or(DomainError::PaymentTermNotFound(index))?;
        if is_default_term(current) {
            warn!(index, "attempt to delete a default payment term");
            return Err(DomainError::ProtectedPaymentTerm);
        }
        let removed = terms.remove(index);
        self.repo
            .save_list(SuggestionList::PaymentTerms, &terms)
            .await?;
        Ok(removed)
    }
}

fn valid_term_length(term: &str) -> bool {
    (PAYMENT_TERM_MIN_CHARS..=PAYMENT_TERM_MAX_CHARS).contains(&term.chars().count())
}

fn validate_term(term: &str) -> Result<String, DomainError> {
    let term = term.trim();
    if !valid_term_length(term) {
        return Err(DomainError::Validation(format!(
            "payment term must have between {PAYMENT_TERM_MIN_CHARS} and {PAYMENT_TERM_MAX_CHARS} characters"
        )));
    }
    Ok(term.to_string())
}

fn ensure_unique(terms: &[String], term: &str, skip: Option<usize>) -> Result<(), DomainError> {
    let lowered = term.to_lowercase();
    let clash = terms
        .iter()
        .enumerate()
        .any(|(i, t)| Some(i) != skip && t.to_lowercase() == lowered);
    if clash {
        return Err(DomainError::DuplicatePaymentTerm(term.to_string()));
    }
    Ok(())
}
