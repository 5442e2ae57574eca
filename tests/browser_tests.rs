//! Browser module tests
//!
//! These tests verify browser configuration and navigation validation.
//! Note: the live test requires a Chrome/Chromium install and is ignored by
//! default; run it with `cargo test -- --ignored`.

use feedmark::browser::{validate_url, BrowserConfig, NavigationOptions};
use feedmark::config::PlatformProfile;
use feedmark::error::NavigationError;

#[test]
fn test_browser_config_default() {
    let config = BrowserConfig::default();
    assert!(config.headless);
    assert_eq!(config.width, 1920);
    assert_eq!(config.height, 1080);
    assert!(config.sandbox);
    assert_eq!(config.timeout_ms, 30000);
    assert!(config.user_agent.is_none());
    assert!(config.chrome_path.is_none());
    assert!(config.extra_args.is_empty());
}

#[test]
fn test_browser_config_builder() {
    let config = BrowserConfig::builder()
        .headless(false)
        .chrome_path("/usr/bin/chromium")
        .arg("--disable-gpu")
        .arg("--no-first-run")
        .build();

    assert!(!config.headless);
    assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    assert_eq!(config.extra_args.len(), 2);
}

#[test]
fn test_navigation_options_default() {
    let opts = NavigationOptions::default();
    assert_eq!(opts.retries, 2);
}

#[test]
fn test_validate_url() {
    assert_eq!(validate_url("https://x.com/home").unwrap().host_str(), Some("x.com"));
    assert!(matches!(
        validate_url("about:blank"),
        Err(NavigationError::InvalidUrl(_))
    ));
}

#[test]
fn test_platform_pages() {
    let x = PlatformProfile::x();
    assert!(x.is_platform_page("https://x.com/home"));
    assert!(x.is_platform_page("https://mobile.twitter.com/i/lists/1"));
    assert!(!x.is_platform_page("https://t.co/abc"));
    assert!(!x.is_platform_page("https://notx.com/home"));
    assert!(!x.is_platform_page("not a url"));
}

#[tokio::test]
#[ignore = "requires a local Chrome/Chromium"]
async fn test_live_snapshot_of_local_file() {
    use feedmark::browser::BrowserController;
    use feedmark::extraction::PageSource;
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
    write!(
        file,
        r#"<article data-testid="tweet"><a href="https://example.com/">Example</a></article>"#
    )
    .unwrap();
    let url = format!("file://{}", file.path().display());

    let browser = BrowserController::with_config(BrowserConfig::builder().sandbox(false).build())
        .await
        .unwrap();
    let page = browser.navigate(&url).await.unwrap();

    let snapshot = page.snapshot().await.unwrap();
    assert!(snapshot.html.contains("data-testid=\"tweet\""));
    assert_eq!(snapshot.base_url.unwrap().scheme(), "file");
    page.scroll_to_bottom().await.unwrap();

    browser.close().await.unwrap();
}
