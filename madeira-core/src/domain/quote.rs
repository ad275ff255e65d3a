use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::wood::{Totals, WoodItem, totals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_contact: String,
    #[serde(default)]
    pub payment_terms: String,
    pub items: Vec<WoodItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Wraps the pending list; client data is taken from its first row.
    pub fn from_items(items: Vec<WoodItem>, now: DateTime<Utc>) -> Self {
        let details = items
            .first()
            .map(|item| item.details.clone())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            client_name: details.client_name,
            client_contact: details.client_contact,
            payment_terms: details.payment_terms,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn number(&self) -> String {
        let id = self.id.simple().to_string();
        format!("ORÇ-{}", &id[..6])
    }

    pub fn totals(&self) -> Totals {
        totals(&self.items)
    }
}

/// Partial edit applied by `update_quote`; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteUpdate {
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub payment_terms: Option<String>,
    pub items: Option<Vec<WoodItem>>,
}

impl QuoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.client_contact.is_none()
            && self.payment_terms.is_none()
            && self.items.is_none()
    }

    pub fn apply(self, quote: &mut Quote, now: DateTime<Utc>) {
        if let Some(name) = self.client_name {
            quote.client_name = name;
        }
        if let Some(contact) = self.client_contact {
            quote.client_contact = contact;
        }
        if let Some(terms) = self.payment_terms {
            quote.payment_terms = terms;
        }
        if let Some(items) = self.items {
            quote.items = items;
        }
        quote.updated_at = now;
    }
}
