use std::sync::Arc;

use askama::Template;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::data::profile_repository::ProfileRepository;
use crate::data::quote_repository::QuoteRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::report_viewer::ReportViewer;
use crate::presentation::report::{CompanyHeader, QuoteReport, ReportClient, ReportVariant};

/// A rendered document and the name it is shown under.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub name: String,
    pub html: String,
}

#[derive(Clone)]
pub struct ReportService<Q, P>
where
    Q: QuoteRepository + 'static,
    P: ProfileRepository + 'static,
{
    quotes: Arc<Q>,
    profiles: Arc<P>,
    viewer: Arc<dyn ReportViewer>,
    clock: Arc<dyn Clock>,
}

impl<Q, P> ReportService<Q, P>
where
    Q: QuoteRepository + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(
        quotes: Arc<Q>,
        profiles: Arc<P>,
        viewer: Arc<dyn ReportViewer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            quotes,
            profiles,
            viewer,
            clock,
        }
    }

    pub async fn render(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        variant: ReportVariant,
    ) -> Result<RenderedReport, DomainError> {
        let quote = self
            .quotes
            .find_by_id(user_id, quote_id)
            .await?
            .ok_or(DomainError::QuoteNotFound(quote_id))?;
        let header = self.header(user_id).await?;
        let client = ReportClient {
            name: quote.client_name.clone(),
            contact: quote.client_contact.clone(),
            payment_terms: quote.payment_terms.clone(),
        };
        let number = quote.number();
        let report = QuoteReport::build(
            number.clone(),
            quote.created_at,
            &client,
            &quote.items,
            header,
            variant,
            self.clock.now(),
        );
        Ok(RenderedReport {
            name: format!("{number}-{variant}"),
            html: render_html(&report)?,
        })
    }

    /// Report straight from the pending list, nothing is saved.
    pub async fn render_current_list(
        &self,
        user_id: Uuid,
        client: &ReportClient,
        variant: ReportVariant,
    ) -> Result<RenderedReport, DomainError> {
        let items = self.quotes.current_items().await?;
        if items.is_empty() {
            return Err(DomainError::EmptyWoodList);
        }
        let now = self.clock.now();
        let number = format!("LISTA-{}", now.format("%Y%m%d%H%M%S"));
        let report = QuoteReport::build(
            number.clone(),
            now,
            client,
            &items,
            self.header(user_id).await?,
            variant,
            now,
        );
        Ok(RenderedReport {
            name: format!("{number}-{variant}"),
            html: render_html(&report)?,
        })
    }

    /// Renders and hands the document to the viewer.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        variant: ReportVariant,
    ) -> Result<String, DomainError> {
        let report = self.render(user_id, quote_id, variant).await?;
        self.show(report).await
    }

    #[instrument(skip(self, client))]
    pub async fn open_current_list(
        &self,
        user_id: Uuid,
        client: &ReportClient,
        variant: ReportVariant,
    ) -> Result<String, DomainError> {
        let report = self.render_current_list(user_id, client, variant).await?;
        self.show(report).await
    }

    async fn show(&self, report: RenderedReport) -> Result<String, DomainError> {
        self.viewer
            .show(&report.name, &report.html)
            .await
            .map_err(|e| {
                error!(name = %report.name, "failed to show report: {}", e);
                DomainError::ReportUnavailable(e.to_string())
            })
    }

    async fn header(&self, user_id: Uuid) -> Result<CompanyHeader, DomainError> {
        let profile = self.profiles.profile(user_id).await?.unwrap_or_default();
        Ok(CompanyHeader::from(&profile))
    }
}

fn render_html(report: &QuoteReport) -> Result<String, DomainError> {
    report.render().map_err(|e| {
        error!("template error: {}", e);
        DomainError::Internal(format!("template error: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::profile_repository::KvProfileRepository;
    use crate::data::quote_repository::KvQuoteRepository;
    use crate::data::store::Storage;
    use crate::domain::quote::Quote;
    use crate::domain::wood::{CalculationInput, ItemDetails, WoodItem};
    use crate::infrastructure::clock::MockClock;
    use async_trait::async_trait;
    use chrono::Utc;

    struct BlockedViewer;

    #[async_trait]
    impl ReportViewer for BlockedViewer {
        async fn show(&self, _name: &str, _html: &str) -> Result<String, std::io::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "popup blocked"))
        }
    }

    #[tokio::test]
    async fn unknown_quote_is_not_rendered() {
        let storage = Storage::in_memory();
        let svc = ReportService::new(
            Arc::new(KvQuoteRepository::new(storage.clone())),
            Arc::new(KvProfileRepository::new(storage)),
            Arc::new(BlockedViewer),
            Arc::new(MockClock::default()),
        );
        let id = Uuid::new_v4();
        assert!(matches!(
            svc.open(Uuid::new_v4(), id, ReportVariant::Simple).await,
            Err(DomainError::QuoteNotFound(q)) if q == id
        ));
        assert!(matches!(
            svc.render_current_list(Uuid::new_v4(), &ReportClient::default(), ReportVariant::Simple).await,
            Err(DomainError::EmptyWoodList)
        ));
    }

    #[tokio::test]
    async fn blocked_viewer_reports_unavailable() {
        let storage = Storage::in_memory();
        let quotes = Arc::new(KvQuoteRepository::new(storage.clone()));
        let svc = ReportService::new(
            Arc::clone(&quotes),
            Arc::new(KvProfileRepository::new(storage)),
            Arc::new(BlockedViewer),
            Arc::new(MockClock::default()),
        );
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let item = WoodItem::new(
            ItemDetails::default(),
            CalculationInput {
                thickness: 5.0,
                width: 10.0,
                length: 300.0,
                quantity: 2,
                package_quantity: 1,
                price: 1000.0,
            },
            now,
        );
        let quote = quotes
            .create(user_id, Quote::from_items(vec![item], now))
            .await
            .unwrap();

        assert!(svc.render(user_id, quote.id, ReportVariant::WithUnitPrice).await.is_ok());
        assert!(matches!(
            svc.open(user_id, quote.id, ReportVariant::WithUnitPrice).await,
            Err(DomainError::ReportUnavailable(_))
        ));
        // The stored quote is left as it was.
        assert_eq!(quotes.find_by_id(user_id, quote.id).await.unwrap(), Some(quote));
    }
}
