#![forbid(unsafe_code)]

use lager_api::{DemoProfile, InventoryApi, LagerError, MockApi, Role, SimApi};

#[tokio::test]
async fn admin_credentials_yield_the_admin_identity() {
    let api = SimApi::instant(0, 1);
    let user = api.login("admin@lager.dev", "admin123").await.unwrap();
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.name, "Alex Johnson");
    assert_eq!(user.email, "admin@lager.dev");
}

#[tokio::test]
async fn any_email_with_long_enough_password_is_an_analyst() {
    let api = SimApi::instant(0, 1);
    let user = api.login("sam@example.com", "hunter22").await.unwrap();
    assert_eq!(user.role, Role::Analyst);
    assert_eq!(user.name, "sam", "display name comes from the email local part");
}

#[tokio::test]
async fn short_password_or_empty_email_is_rejected() {
    let api = SimApi::instant(0, 1);
    let err = api.login("sam@example.com", "short").await.unwrap_err();
    assert!(matches!(err, LagerError::Auth(_)));

    let err = api.login("", "longenough").await.unwrap_err();
    assert!(matches!(err, LagerError::Auth(_)));
}

#[tokio::test]
async fn fetch_inventory_is_deterministic_for_a_seed() {
    let api = SimApi::instant(200, 42);
    let mut a = api.fetch_inventory().await.unwrap();
    let mut b = SimApi::instant(200, 42).fetch_inventory().await.unwrap();
    assert_eq!(a.len(), 200);
    assert_eq!(a[0].id, "prod-1");
    assert_eq!(a[199].sku, "SKU-000200");
    // the age stamps are relative to the call time; everything else is a
    // pure function of the seed
    for p in a.iter_mut().chain(b.iter_mut()) {
        p.last_updated = 0;
    }
    assert_eq!(a, b);
}

#[tokio::test]
async fn demo_fetch_fails_when_the_coin_says_so() {
    let always = SimApi::instant(0, 9).with_demo_fail_rate(1.0);
    let err = always.fetch_profile().await.unwrap_err();
    assert!(matches!(err, LagerError::Internal(_)));

    let never = SimApi::instant(0, 9);
    let profile = never.fetch_profile().await.unwrap();
    assert_eq!(profile.role, "Inventory Analyst");
}

#[tokio::test]
async fn mock_api_returns_what_it_is_configured_with() {
    let mut api = MockApi::new();
    api.profile = Some(DemoProfile { name: "Test".into(), role: "Viewer".into() });
    assert!(api.login("x", "y").await.is_err());
    assert!(api.fetch_inventory().await.unwrap().is_empty());
    assert_eq!(api.fetch_profile().await.unwrap().name, "Test");
}
