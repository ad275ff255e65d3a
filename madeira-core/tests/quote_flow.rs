use std::sync::Arc;

use chrono::{TimeZone, Utc};
use madeira_core::application::calculator::CalculationForm;
use madeira_core::data::store::Storage;
use madeira_core::domain::quote::QuoteUpdate;
use madeira_core::domain::wood::ItemDetails;
use madeira_core::infrastructure::clock::MockClock;
use madeira_core::infrastructure::report_viewer::FileViewer;
use madeira_core::infrastructure::storage::open_storage;
use madeira_core::presentation::report::ReportVariant;
use madeira_core::{AppContext, DomainError};
use uuid::Uuid;

fn board(quantity: &str, package: &str) -> CalculationForm {
    CalculationForm {
        thickness: "5".into(),
        width: "10".into(),
        length: "300".into(),
        quantity: quantity.into(),
        package_quantity: package.into(),
        price: "R$ 1.000,00".into(),
    }
}

fn details() -> ItemDetails {
    ItemDetails {
        client_name: "Construtora Pinheiro".into(),
        client_contact: "11987654321".into(),
        payment_terms: "30 dias".into(),
        species: "Eucalipto".into(),
    }
}

async fn logged_in(storage: Storage, reports: &std::path::Path) -> (AppContext, Uuid) {
    let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap());
    let ctx = AppContext::new(
        storage,
        Arc::new(clock),
        Arc::new(FileViewer::new(reports)),
        None,
    );
    let user = ctx
        .auth
        .register("joao@madeireira.com".into(), "segredo1".into(), "João".into())
        .await
        .unwrap();
    (ctx, user.id)
}

#[tokio::test]
async fn saved_quote_reloads_with_same_totals() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, user_id) = logged_in(Storage::in_memory(), dir.path()).await;

    ctx.quotes.add_item(details(), &board("2", "")).await.unwrap();
    ctx.quotes.add_item(details(), &board("3", "4")).await.unwrap();
    let before = ctx.quotes.list_totals().await.unwrap();
    assert_eq!(before.items, 2);
    assert!((before.total_volume - 0.210).abs() < 1e-9);
    assert!((before.total_cost - 210.0).abs() < 1e-6);

    let quote = ctx.quotes.save_quote(user_id).await.unwrap();
    assert_eq!(quote.client_name, "Construtora Pinheiro");
    assert!(ctx.quotes.current_items().await.unwrap().is_empty());

    let items = ctx.quotes.load_quote_into_list(user_id, quote.id).await.unwrap();
    assert_eq!(items.len(), 2);
    let after = ctx.quotes.list_totals().await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn empty_list_cannot_be_saved() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, user_id) = logged_in(Storage::in_memory(), dir.path()).await;

    let err = ctx.quotes.save_quote(user_id).await.unwrap_err();
    assert!(matches!(err, DomainError::EmptyWoodList));
}

#[tokio::test]
async fn missing_quote_is_reported_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, user_id) = logged_in(Storage::in_memory(), dir.path()).await;
    let ghost = Uuid::new_v4();

    let update = QuoteUpdate {
        client_name: Some("Outro".into()),
        ..QuoteUpdate::default()
    };
    assert!(ctx.quotes.update_quote(user_id, ghost, update).await.unwrap().is_none());
    assert!(!ctx.quotes.delete_quote(user_id, ghost).await.unwrap());
    assert!(matches!(
        ctx.quotes.get_quote(user_id, ghost).await.unwrap_err(),
        DomainError::QuoteNotFound(id) if id == ghost
    ));
}

#[tokio::test]
async fn quote_report_is_written_to_reports_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, user_id) = logged_in(Storage::in_memory(), dir.path()).await;

    ctx.quotes.add_item(details(), &board("2", "")).await.unwrap();
    let quote = ctx.quotes.save_quote(user_id).await.unwrap();

    let location = ctx
        .reports
        .open(user_id, quote.id, ReportVariant::WithUnitPrice)
        .await
        .unwrap();
    let expected = dir
        .path()
        .join(format!("{}-unit-price.html", quote.number()));
    assert_eq!(location, expected.display().to_string());

    let html = std::fs::read_to_string(expected).unwrap();
    assert!(html.contains("ORÇAMENTO"));
    assert!(html.contains("Construtora Pinheiro"));
    assert!(html.contains("R$ 30,00"));
    assert!(html.contains("0,030m³"));
}

#[tokio::test]
async fn current_list_report_needs_items() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, user_id) = logged_in(Storage::in_memory(), dir.path()).await;
    let client = madeira_core::presentation::report::ReportClient {
        name: String::new(),
        contact: String::new(),
        payment_terms: String::new(),
    };

    let err = ctx
        .reports
        .open_current_list(user_id, &client, ReportVariant::Simple)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmptyWoodList));
}

#[tokio::test]
async fn data_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("madeira.json");

    let user_id = {
        let (ctx, user_id) = logged_in(open_storage(&path).await.unwrap(), dir.path()).await;
        ctx.quotes.add_item(details(), &board("2", "")).await.unwrap();
        ctx.quotes.save_quote(user_id).await.unwrap();
        user_id
    };

    let ctx = AppContext::new(
        open_storage(&path).await.unwrap(),
        Arc::new(MockClock::default()),
        Arc::new(FileViewer::new(dir.path())),
        None,
    );
    assert_eq!(ctx.auth.require_user().await.unwrap().id, user_id);
    assert_eq!(ctx.quotes.list_quotes(user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn account_export_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, user_id) = logged_in(Storage::in_memory(), dir.path()).await;

    ctx.quotes.add_item(details(), &board("2", "")).await.unwrap();
    ctx.quotes.save_quote(user_id).await.unwrap();

    let export = ctx.accounts.export_account(user_id).await.unwrap();
    assert_eq!(export.version, "2.0.0");
    assert_eq!(export.quotes.len(), 1);
    let json = serde_json::to_value(&export).unwrap();
    assert!(json["user"].get("passwordHash").is_none());

    ctx.accounts.delete_account(user_id).await.unwrap();
    assert!(ctx.auth.current_user().await.unwrap().is_none());
    assert!(ctx.quotes.list_quotes(user_id).await.unwrap().is_empty());
    assert!(matches!(
        ctx.accounts.delete_account(user_id).await.unwrap_err(),
        DomainError::UserNotFound(_)
    ));
}
