use super::*;

async fn setup() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .create_api_key("abc123", Some("test"))
        .await
        .expect("key");
    storage.grant_dataset("abc123", "beta").await.expect("grant");
    storage.grant_dataset("abc123", "alpha").await.expect("grant");
    ApiContext { storage }
}

#[tokio::test]
async fn known_key_lists_its_datasets() {
    let ctx = setup().await;
    let options = list_options(&ctx, "abc123").await.expect("options");
    assert_eq!(options, vec!["alpha".to_string(), "beta".to_string()]);
}

#[tokio::test]
async fn known_key_without_grants_gets_empty_list() {
    let ctx = setup().await;
    ctx.storage
        .create_api_key("fresh", None)
        .await
        .expect("key");
    let options = list_options(&ctx, "fresh").await.expect("options");
    assert!(options.is_empty());
}

#[tokio::test]
async fn unknown_key_is_forbidden() {
    let ctx = setup().await;
    let err = list_options(&ctx, "bad-key").await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn blank_key_is_unauthorized() {
    let ctx = setup().await;
    let err = list_options(&ctx, "   ").await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn revoked_key_is_forbidden() {
    let ctx = setup().await;
    ctx.storage.revoke_api_key("abc123").await.expect("revoke");
    let err = list_options(&ctx, "abc123").await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Forbidden);
    assert_eq!(err.message, "api key revoked");
}

#[tokio::test]
async fn health_reports_live_storage() {
    let ctx = setup().await;
    health(&ctx).await.expect("healthy");
}

#[tokio::test]
async fn empty_selection_means_every_granted_dataset() {
    let ctx = setup().await;
    let selected = select_datasets(&ctx, "abc123", &[]).await.expect("selection");
    assert_eq!(selected, vec!["alpha".to_string(), "beta".to_string()]);
}

#[tokio::test]
async fn selection_keeps_granted_order_without_repeats() {
    let ctx = setup().await;
    let requested = vec!["beta".to_string(), "alpha".to_string(), "beta".to_string()];
    let selected = select_datasets(&ctx, "abc123", &requested)
        .await
        .expect("selection");
    assert_eq!(selected, vec!["alpha".to_string(), "beta".to_string()]);
}

#[tokio::test]
async fn selecting_an_ungranted_dataset_is_a_validation_error() {
    let ctx = setup().await;
    let requested = vec!["alpha".to_string(), "gamma".to_string()];
    let err = select_datasets(&ctx, "abc123", &requested)
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.contains("gamma"));
}

#[tokio::test]
async fn selection_still_checks_the_key() {
    let ctx = setup().await;
    let err = select_datasets(&ctx, "bad-key", &["alpha".to_string()])
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Forbidden);
}
