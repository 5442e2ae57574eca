//! Page sources
//!
//! The orchestrator reads the page through [`PageSource`]. Live browser tabs
//! implement it in `crate::browser`; saved HTML uses [`StaticPage`].

use super::dom::PageSnapshot;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Something that can be snapshotted and scrolled
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Serialize the current document
    async fn snapshot(&self) -> Result<PageSnapshot>;

    /// Scroll to the bottom of the page to trigger lazy loading
    async fn scroll_to_bottom(&self) -> Result<()>;
}

/// A fixed HTML document; scrolling does nothing
#[derive(Debug, Clone)]
pub struct StaticPage {
    snapshot: PageSnapshot,
}

impl StaticPage {
    /// Wrap an HTML string
    pub fn new(html: impl Into<String>, base_url: Option<Url>) -> Self {
        Self {
            snapshot: PageSnapshot::new(html, base_url),
        }
    }

    /// Read an HTML file from disk
    pub async fn from_file(path: &Path, base_url: Option<Url>) -> Result<Self> {
        let html = tokio::fs::read_to_string(path).await?;
        debug!("Loaded {} bytes from {}", html.len(), path.display());
        Ok(Self::new(html, base_url))
    }
}

#[async_trait]
impl PageSource for StaticPage {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_page_snapshot() {
        let page = StaticPage::new("<p>hi</p>", Url::parse("https://x.com/").ok());
        let snap = page.snapshot().await.unwrap();
        assert_eq!(snap.html, "<p>hi</p>");
        assert_eq!(snap.base_url.unwrap().as_str(), "https://x.com/");
        page.scroll_to_bottom().await.unwrap();
    }

    #[tokio::test]
    async fn test_static_page_from_missing_file() {
        let result = StaticPage::from_file(Path::new("/definitely/not/here.html"), None).await;
        assert!(result.is_err());
    }
}
