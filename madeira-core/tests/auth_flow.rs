use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use madeira_core::domain::plan::PlanKind;
use madeira_core::infrastructure::clock::{Clock, MockClock};
use madeira_core::data::store::Storage;
use madeira_core::infrastructure::report_viewer::FileViewer;
use madeira_core::{AppContext, DomainError};

fn context(clock: &MockClock) -> AppContext {
    AppContext::new(
        Storage::in_memory(),
        Arc::new(clock.clone()),
        Arc::new(FileViewer::new(std::env::temp_dir())),
        Some("admin-secret".to_string()),
    )
}

fn start() -> MockClock {
    MockClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let clock = start();
    let ctx = context(&clock);

    ctx.auth
        .register("ana@serraria.com".into(), "segredo1".into(), "Ana".into())
        .await
        .unwrap();
    let err = ctx
        .auth
        .register("ANA@serraria.com".into(), "outra123".into(), "Outra".into())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::UserAlreadyExists(_)));
}

#[tokio::test]
async fn free_plan_runs_thirty_days() {
    let clock = start();
    let ctx = context(&clock);

    let user = ctx
        .auth
        .register("bia@serraria.com".into(), "segredo1".into(), "Bia".into())
        .await
        .unwrap();

    assert_eq!(user.plan.kind, PlanKind::Free);
    assert_eq!(user.plan.end_date, Some(clock.now() + Duration::days(30)));
    assert!(ctx.auth.is_plan_active(&user));
    assert_eq!(ctx.auth.current_user().await.unwrap().map(|u| u.id), Some(user.id));
}

#[tokio::test]
async fn lapsed_trial_blocks_login_and_marks_plan_expired() {
    let clock = start();
    let ctx = context(&clock);

    let user = ctx
        .auth
        .register("caio@serraria.com".into(), "segredo1".into(), "Caio".into())
        .await
        .unwrap();
    ctx.auth.logout().await.unwrap();

    clock.advance(Duration::days(31));
    let err = ctx
        .auth
        .login("caio@serraria.com", "segredo1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PlanExpired));

    let stored = ctx.auth.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan.kind, PlanKind::Expired);
    assert!(ctx.auth.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let clock = start();
    let ctx = context(&clock);
    ctx.auth
        .register("davi@serraria.com".into(), "segredo1".into(), "Davi".into())
        .await
        .unwrap();

    let err = ctx
        .auth
        .login("davi@serraria.com", "errada1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidCredentials));
}

#[tokio::test]
async fn reset_code_locks_after_three_misses() {
    let clock = start();
    let ctx = context(&clock);
    ctx.auth
        .register("eva@serraria.com".into(), "segredo1".into(), "Eva".into())
        .await
        .unwrap();

    let code = ctx.auth.request_password_reset("eva@serraria.com").await.unwrap();
    assert_eq!(code.len(), 6);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for remaining in [2, 1, 0] {
        let err = ctx
            .auth
            .reset_password("eva@serraria.com", wrong, "novasenha")
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidResetCode { remaining: r } if r == remaining),
            "unexpected {err:?}"
        );
    }

    let err = ctx
        .auth
        .reset_password("eva@serraria.com", &code, "novasenha")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TooManyAttempts));

    // The code was discarded with the lockout.
    let err = ctx
        .auth
        .reset_password("eva@serraria.com", &code, "novasenha")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NoPendingReset(_)));
}

#[tokio::test]
async fn reset_code_expires_after_thirty_minutes() {
    let clock = start();
    let ctx = context(&clock);
    ctx.auth
        .register("fabio@serraria.com".into(), "segredo1".into(), "Fábio".into())
        .await
        .unwrap();

    let code = ctx.auth.request_password_reset("fabio@serraria.com").await.unwrap();
    clock.advance(Duration::minutes(31));

    let err = ctx
        .auth
        .reset_password("fabio@serraria.com", &code, "novasenha")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ResetCodeExpired));
}

#[tokio::test]
async fn reset_with_right_code_changes_password() {
    let clock = start();
    let ctx = context(&clock);
    ctx.auth
        .register("gil@serraria.com".into(), "segredo1".into(), "Gil".into())
        .await
        .unwrap();
    ctx.auth.logout().await.unwrap();

    let code = ctx.auth.request_password_reset("gil@serraria.com").await.unwrap();
    ctx.auth
        .reset_password("gil@serraria.com", &code, "novasenha")
        .await
        .unwrap();

    assert!(ctx.auth.login("gil@serraria.com", "segredo1").await.is_err());
    ctx.auth.login("gil@serraria.com", "novasenha").await.unwrap();
}

#[tokio::test]
async fn approved_request_activates_paid_plan() {
    let clock = start();
    let ctx = context(&clock);
    let user = ctx
        .auth
        .register("hugo@serraria.com".into(), "segredo1".into(), "Hugo".into())
        .await
        .unwrap();

    let request = ctx.admin.request_plan(user.id, "yearly").await.unwrap();
    assert!(matches!(
        ctx.admin.pending().await.unwrap_err(),
        DomainError::Forbidden
    ));

    ctx.admin.unlock("admin-secret").await.unwrap();
    assert_eq!(ctx.admin.pending().await.unwrap().len(), 1);
    ctx.admin.approve(request.id).await.unwrap();

    let upgraded = ctx.auth.get_user(user.id).await.unwrap();
    assert_eq!(upgraded.plan.kind, PlanKind::Yearly);
    assert_eq!(
        upgraded.plan.end_date,
        Some(clock.now() + Duration::days(365))
    );

    let stats = ctx.admin.stats().await.unwrap();
    assert_eq!(stats.paid_plans, 1);
    assert_eq!(stats.pending_requests, 0);
}
