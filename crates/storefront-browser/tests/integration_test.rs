use storefront_browser::{BrowserActions, BrowserEngine, BrowserSession, SessionLauncher};
use storefront_core::BrowserSettings;

const PAGE: &str = "data:text/html,<html><body><div class='card'>One</div><div class='card'>Two</div><button class='next disabled'>Next</button></body></html>";

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed"]
async fn test_browser_engine_launch() {
    let engine = BrowserEngine::new();
    let mut session = engine
        .launch(&BrowserSettings::default())
        .await
        .expect("launch browser");
    session.close().await.expect("close browser");
}

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed"]
async fn test_page_queries() {
    let engine = BrowserEngine::new();
    let mut session = engine
        .launch(&BrowserSettings::default())
        .await
        .expect("launch browser");

    session.navigate(PAGE).await.expect("navigate");
    session
        .wait_for_selector(".card", 5_000)
        .await
        .expect("cards render");
    assert_eq!(session.count(".card").await.expect("count cards"), 2);

    let state = session
        .control_state(".next")
        .await
        .expect("query next button")
        .expect("next button present");
    assert!(state.is_inactive());
    assert!(session
        .control_state(".missing")
        .await
        .expect("query missing control")
        .is_none());

    let html = session.content().await.expect("page content");
    assert!(html.contains("Two"));

    session.close().await.expect("close browser");
}

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed"]
async fn test_wait_for_missing_selector_times_out() {
    let engine = BrowserEngine::new();
    let mut session = engine
        .launch(&BrowserSettings::default())
        .await
        .expect("launch browser");

    session.navigate(PAGE).await.expect("navigate");
    let err = session
        .wait_for_selector(".never", 500)
        .await
        .expect_err("selector never appears");
    assert!(err.is_timeout());

    session.close().await.expect("close browser");
    assert!(session.count(".card").await.is_err());
}
