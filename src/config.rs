//! Extraction configuration
//!
//! Platform knowledge (domains, markers, selectors) lives in
//! [`PlatformProfile`]; timing lives in [`ExtractorConfig`]. Both default to
//! the X (Twitter) timeline as rendered in a desktop browser.
//!
//! Environment overrides:
//!
//! - `FEEDMARK_INITIAL_SETTLE_MS`: wait before the first look at the page (default: 1000)
//! - `FEEDMARK_SCROLL_SETTLE_MS`: wait after the bottom scroll (default: 2000)
//! - `FEEDMARK_STORE`: reading list file (default: `reading-list.json`)

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Default store file name
pub const DEFAULT_STORE_FILE: &str = "reading-list.json";

const INITIAL_SETTLE_ENV: &str = "FEEDMARK_INITIAL_SETTLE_MS";
const SCROLL_SETTLE_ENV: &str = "FEEDMARK_SCROLL_SETTLE_MS";
const STORE_ENV: &str = "FEEDMARK_STORE";

/// Everything the engine knows about one social platform's markup and URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Human-readable name, used in messages
    pub display_name: String,
    /// First-party redirect domain whose links are always kept
    pub shortener_domain: String,
    /// Domains (and their subdomains) that host the platform's own pages
    pub primary_domains: Vec<String>,
    /// Path fragments that mark internal content pages
    pub internal_path_markers: Vec<String>,
    /// Query keys removed from every kept URL
    pub tracking_params: Vec<String>,
    /// Post container selectors, most specific first
    pub post_selectors: Vec<String>,
    /// Selector for a post's body text
    pub body_text_selector: String,
    /// Selectors for a post's author, tried in order
    pub author_selectors: Vec<String>,
    /// Export file name prefix
    pub export_prefix: String,
}

impl PlatformProfile {
    /// Profile for x.com / twitter.com
    pub fn x() -> Self {
        Self {
            display_name: "X (Twitter)".to_string(),
            shortener_domain: "t.co".to_string(),
            primary_domains: strings(&["twitter.com", "x.com"]),
            internal_path_markers: strings(&["/status/", "/analytics", "/photo/"]),
            tracking_params: strings(&[
                "utm_source",
                "utm_medium",
                "utm_campaign",
                "utm_content",
                "utm_term",
                "fbclid",
                "gclid",
            ]),
            post_selectors: strings(&[
                r#"article[data-testid="tweet"]"#,
                r#"[data-testid="tweet"]"#,
                r#"article[role="article"]"#,
                r#"div[data-testid="cellInnerDiv"]"#,
                r#"[data-testid="tweetText"]"#,
                "article",
                r#"div[dir="ltr"] > div > div"#,
                r#"[role="article"]"#,
            ]),
            body_text_selector: r#"[data-testid="tweetText"]"#.to_string(),
            author_selectors: strings(&[r#"[data-testid="User-Name"]"#, r#"a[role="link"] span"#]),
            export_prefix: "x-reading-list".to_string(),
        }
    }

    /// Whether `host` is the shortener domain
    pub fn is_shortener_host(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(&self.shortener_domain)
    }

    /// Whether `host` is a primary domain or one of its subdomains
    pub fn is_primary_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.primary_domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Whether `host` belongs to the platform at all (primary or shortener)
    pub fn is_platform_host(&self, host: &str) -> bool {
        self.is_shortener_host(host) || self.is_primary_host(host)
    }

    /// Whether a page URL is one of the platform's own pages
    pub fn is_platform_page(&self, page_url: &str) -> bool {
        url::Url::parse(page_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| self.is_primary_host(h)))
            .unwrap_or(false)
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::x()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Configuration for an extraction pass
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Wait before the first look at the page (default: 1000ms)
    pub initial_settle: Duration,
    /// Wait after scrolling to the bottom (default: 2000ms)
    pub scroll_settle: Duration,
    /// Platform being harvested
    pub platform: PlatformProfile,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_millis(1000),
            scroll_settle: Duration::from_millis(2000),
            platform: PlatformProfile::x(),
        }
    }
}

impl ExtractorConfig {
    /// Create a new config builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }

    /// Defaults overridden by `FEEDMARK_*_SETTLE_MS` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(ms) = millis_from_env(INITIAL_SETTLE_ENV)? {
            config.initial_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = millis_from_env(SCROLL_SETTLE_ENV)? {
            config.scroll_settle = Duration::from_millis(ms);
        }
        debug!(
            initial_ms = config.initial_settle.as_millis() as u64,
            scroll_ms = config.scroll_settle.as_millis() as u64,
            "Extractor config loaded"
        );
        Ok(config)
    }
}

fn millis_from_env(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}

/// Store path from an explicit flag, then `FEEDMARK_STORE`, then the default
pub fn store_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var_os(STORE_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
}

/// Builder for ExtractorConfig
#[derive(Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Set the initial settle delay
    pub fn initial_settle(mut self, delay: Duration) -> Self {
        self.config.initial_settle = delay;
        self
    }

    /// Set the post-scroll settle delay
    pub fn scroll_settle(mut self, delay: Duration) -> Self {
        self.config.scroll_settle = delay;
        self
    }

    /// Use a different platform profile
    pub fn platform(mut self, platform: PlatformProfile) -> Self {
        self.config.platform = platform;
        self
    }

    /// Build the config
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_config_default() {
        let config = ExtractorConfig::default();
        assert_eq!(config.initial_settle, Duration::from_millis(1000));
        assert_eq!(config.scroll_settle, Duration::from_millis(2000));
        assert_eq!(config.platform.shortener_domain, "t.co");
    }

    #[test]
    fn test_extractor_config_builder() {
        let config = ExtractorConfig::builder()
            .initial_settle(Duration::ZERO)
            .scroll_settle(Duration::from_millis(50))
            .build();

        assert_eq!(config.initial_settle, Duration::ZERO);
        assert_eq!(config.scroll_settle, Duration::from_millis(50));
    }

    #[test]
    fn test_primary_host_matching() {
        let x = PlatformProfile::x();
        assert!(x.is_primary_host("x.com"));
        assert!(x.is_primary_host("twitter.com"));
        assert!(x.is_primary_host("pic.twitter.com"));
        assert!(x.is_primary_host("Mobile.Twitter.com"));
        assert!(!x.is_primary_host("box.com"));
        assert!(!x.is_primary_host("nottwitter.com"));
        assert!(!x.is_primary_host("t.co"));
    }

    #[test]
    fn test_platform_host_includes_shortener() {
        let x = PlatformProfile::x();
        assert!(x.is_platform_host("t.co"));
        assert!(x.is_platform_host("x.com"));
        assert!(!x.is_platform_host("example.com"));
    }

    #[test]
    fn test_is_platform_page() {
        let x = PlatformProfile::x();
        assert!(x.is_platform_page("https://x.com/home"));
        assert!(x.is_platform_page("https://twitter.com/someone"));
        assert!(!x.is_platform_page("https://example.com/x.com"));
        assert!(!x.is_platform_page("not a url"));
    }

    #[test]
    fn test_store_path_explicit_wins() {
        let path = store_path(Some(PathBuf::from("/tmp/list.json")));
        assert_eq!(path, PathBuf::from("/tmp/list.json"));
    }
}
