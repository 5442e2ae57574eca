//! Page navigation functionality
//!
//! URL validation, navigation with retries and readiness waits. Feed pages
//! keep loading after the load event, so callers that need posts should
//! follow `goto` with `wait_for_selector`.

use crate::browser::PageHandle;
use crate::error::{Error, NavigationError, Result};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Longest URL accepted for navigation
pub const MAX_URL_LEN: usize = 2048;

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Number of retry attempts (default: 2)
    pub retries: u32,
    /// Delay between retries in ms (default: 1000)
    pub retry_delay_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

const WAIT_FOR_LOAD_JS: &str = r#"
    new Promise(resolve => {
        if (document.readyState === 'complete') {
            resolve(true);
        } else {
            window.addEventListener('load', () => resolve(true));
        }
    })
"#;

/// Check that `url` is something a browser tab can be pointed at
pub fn validate_url(url: &str) -> std::result::Result<Url, NavigationError> {
    if url.is_empty() {
        return Err(NavigationError::InvalidUrl("URL cannot be empty".to_string()));
    }
    if url.len() > MAX_URL_LEN {
        return Err(NavigationError::InvalidUrl(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LEN
        )));
    }

    let parsed = Url::parse(url).map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", e, url)))?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        _ => Err(NavigationError::InvalidUrl(format!(
            "URL must start with http://, https://, or file://: {}",
            url
        ))),
    }
}

/// Page navigation operations
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL, retrying failed attempts; returns the final URL
    #[instrument(skip(page, options))]
    pub async fn goto(
        page: &PageHandle,
        url: &str,
        options: Option<NavigationOptions>,
    ) -> Result<String> {
        let opts = options.unwrap_or_default();

        validate_url(url)?;
        info!("Navigating to: {}", url);

        let mut last_error = None;
        for attempt in 0..=opts.retries {
            if attempt > 0 {
                warn!("Navigation retry attempt {} of {}", attempt, opts.retries);
                tokio::time::sleep(Duration::from_millis(opts.retry_delay_ms)).await;
            }

            match Self::navigate_once(&page.page, url, &opts).await {
                Ok(final_url) => {
                    page.set_url(final_url.clone()).await;
                    return Ok(final_url);
                }
                Err(e) => {
                    warn!("Navigation attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            NavigationError::LoadFailed("Navigation failed after all retries".to_string()).into()
        }))
    }

    async fn navigate_once(
        page: &chromiumoxide::Page,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<String> {
        let timeout = Duration::from_millis(opts.timeout_ms);

        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(opts.timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        tokio::time::timeout(timeout, page.evaluate(WAIT_FOR_LOAD_JS))
            .await
            .map_err(|_| NavigationError::Timeout(opts.timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        let final_url = page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        debug!("Navigation complete: {} -> {}", url, final_url);
        Ok(final_url)
    }

    /// Wait for an element matching `selector` to appear
    #[instrument(skip(page))]
    pub async fn wait_for_selector(
        page: &PageHandle,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<()> {
        let script = format!(
            r#"
                new Promise((resolve, reject) => {{
                    const timeout = {};
                    const start = Date.now();

                    function check() {{
                        const el = document.querySelector('{}');
                        if (el) {{
                            resolve(true);
                        }} else if (Date.now() - start > timeout) {{
                            reject(new Error('Timeout waiting for selector'));
                        }} else {{
                            requestAnimationFrame(check);
                        }}
                    }}
                    check();
                }})
            "#,
            timeout_ms,
            selector.replace('\'', "\\'")
        );

        let timeout = Duration::from_millis(timeout_ms + 1000);
        tokio::time::timeout(timeout, page.page.evaluate(script.as_str()))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(())
    }
}
