//! Browser lifecycle management
//!
//! This module handles browser launch or attachment, shutdown, and page
//! management. Timelines usually need a signed-in session, so besides
//! launching a fresh Chromium the controller can attach to a running one
//! started with `--remote-debugging-port`.

use crate::config::PlatformProfile;
use crate::error::{BrowserError, Error, ExtractionError, Result};
use crate::extraction::{PageSnapshot, PageSource};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width (default: 1920)
    pub width: u32,
    /// Browser window height (default: 1080)
    pub height: u32,
    /// Enable sandbox (default: true for production)
    pub sandbox: bool,
    /// User agent string (None = use default)
    pub user_agent: Option<String>,
    /// Navigation timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            sandbox: true,
            user_agent: None,
            timeout_ms: 30000,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Create a new config builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// Set navigation timeout
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// Handle to an open browser page
#[derive(Clone)]
pub struct PageHandle {
    pub(crate) page: Page,
    pub(crate) url: Arc<RwLock<String>>,
}

impl PageHandle {
    pub(crate) fn new(page: Page, url: impl Into<String>) -> Self {
        Self {
            page,
            url: Arc::new(RwLock::new(url.into())),
        }
    }

    /// Get the last known URL
    pub async fn url(&self) -> String {
        self.url.read().await.clone()
    }

    /// Set the current URL (internal use)
    pub(crate) async fn set_url(&self, url: String) {
        *self.url.write().await = url;
    }
}

#[async_trait]
impl PageSource for PageHandle {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| ExtractionError::SnapshotFailed(e.to_string()))?;

        let current = match self.page.url().await {
            Ok(Some(url)) => {
                self.set_url(url.clone()).await;
                url
            }
            _ => self.url().await,
        };

        debug!("Snapshot of {}: {} bytes", current, html.len());
        Ok(PageSnapshot::new(html, Url::parse(&current).ok()))
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate(SCROLL_TO_BOTTOM_JS)
            .await
            .map_err(|e| ExtractionError::ScrollFailed(e.to_string()))?;
        Ok(())
    }
}

/// High-level browser controller
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
    config: BrowserConfig,
    attached: bool,
}

impl BrowserController {
    /// Create a new browser controller with default config
    #[instrument]
    pub async fn new() -> Result<Self> {
        Self::with_config(BrowserConfig::default()).await
    }

    /// Launch a browser with custom config
    #[instrument(skip(config))]
    pub async fn with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser with config: headless={}",
            config.headless
        );

        let mut builder = CdpBrowserConfig::builder();

        builder = builder.viewport(chromiumoxide::handler::viewport::Viewport {
            width: config.width,
            height: config.height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        });

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.arg("--no-sandbox");
        }

        if let Some(ref ua) = config.user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        for arg in &config.extra_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder.build().map_err(BrowserError::ConfigError)?;

        let (browser, handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            handler: Self::spawn_handler(handler),
            config,
            attached: false,
        })
    }

    /// Attach to a running browser's DevTools endpoint
    #[instrument]
    pub async fn attach(debug_url: &str) -> Result<Self> {
        info!("Attaching to browser at {}", debug_url);

        let (browser, handler) = Browser::connect(debug_url)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        Ok(Self {
            browser,
            handler: Self::spawn_handler(handler),
            config: BrowserConfig::default(),
            attached: true,
        })
    }

    fn spawn_handler(mut handler: chromiumoxide::handler::Handler) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        })
    }

    /// Create a new page/tab
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<PageHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        debug!("Created new page");
        Ok(PageHandle::new(page, "about:blank"))
    }

    /// Navigate to URL and return page handle
    #[instrument(skip(self))]
    pub async fn navigate(&self, url: &str) -> Result<PageHandle> {
        let page_handle = self.new_page().await?;
        let options = super::navigation::NavigationOptions {
            timeout_ms: self.config.timeout_ms,
            ..Default::default()
        };
        let final_url = super::navigation::PageNavigator::goto(&page_handle, url, Some(options)).await?;
        if final_url != url {
            debug!("Redirected to {}", final_url);
        }
        Ok(page_handle)
    }

    /// First open tab showing one of the platform's pages
    #[instrument(skip(self, platform))]
    pub async fn find_platform_tab(&self, platform: &PlatformProfile) -> Result<Option<PageHandle>> {
        let pages = self.browser.pages().await.map_err(|e| Error::cdp(e.to_string()))?;

        for page in pages {
            let Ok(Some(url)) = page.url().await else {
                continue;
            };
            if platform.is_platform_page(&url) {
                info!("Using open tab {}", url);
                return Ok(Some(PageHandle::new(page, url)));
            }
        }

        Ok(None)
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Close the browser; attached browsers are only disconnected
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        if self.attached {
            info!("Detaching from browser");
            self.handler.abort();
            return Ok(());
        }

        info!("Closing browser");
        self.browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;

        info!("Browser closed");
        Ok(())
    }
}
