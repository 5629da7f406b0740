use leadscan_browser::{BrowserActions, BrowserEngine, FieldQuery};
use std::time::Duration;

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_browser_engine_creation() {
    let engine = BrowserEngine::new().await;
    assert!(engine.is_ok(), "Failed to create browser engine");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_and_reads() {
    let engine = BrowserEngine::new().await.unwrap();

    engine
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .expect("navigate");

    let matched = engine
        .wait_for_any(&["h1".to_string()], Duration::from_secs(5))
        .await
        .expect("wait for heading");
    assert_eq!(matched, Some(0));

    let title = engine
        .read_field(&FieldQuery::text("h1"))
        .await
        .expect("read heading");
    assert_eq!(title.as_deref(), Some("Example Domain"));

    assert_eq!(engine.count_matches("h1").await.unwrap(), 1);
    assert!(engine
        .read_field(&FieldQuery::text("button.missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_session_recycle() {
    let engine = BrowserEngine::new().await.unwrap();

    engine.close_session().await.expect("close session");
    assert!(engine
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .is_err());

    engine.new_session().await.expect("reopen session");
    assert!(engine
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .is_ok());
}
