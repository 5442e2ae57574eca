//! Post container discovery
//!
//! The platform reshuffles its markup often, so posts are located with an
//! ordered list of strategies, most specific first. The first strategy
//! that matches anything wins. When none match, a whole-document scan keeps
//! every element that looks like it carries an outbound link.

use super::dom::{anchor_selector, text_content, ParsedPage, PostElement};
use super::metadata::parse_selector;
use crate::config::PlatformProfile;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

/// Minimum text length (exclusive) for a fallback post candidate, in UTF-16
/// code units as the DOM counts them
pub const FALLBACK_MIN_TEXT_CHARS: usize = 20;

/// One structural query in the cascade
#[derive(Debug, Clone)]
pub struct LocatorStrategy {
    name: String,
    selector: Selector,
}

impl LocatorStrategy {
    /// Build a strategy from a CSS selector; `None` if it does not parse
    pub fn from_css(css: &str) -> Option<Self> {
        parse_selector(css).map(|selector| Self {
            name: css.to_string(),
            selector,
        })
    }

    /// Selector text
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All matches in document order
    pub fn matches<'a>(&self, page: &'a ParsedPage) -> Vec<ElementRef<'a>> {
        page.document().select(&self.selector).collect()
    }
}

/// Match count of one strategy, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyHit {
    /// Selector text
    pub strategy: String,
    /// Number of matching elements
    pub count: usize,
}

/// Finds post containers in a parsed page
#[derive(Debug, Clone)]
pub struct PostLocator {
    strategies: Vec<LocatorStrategy>,
    platform: PlatformProfile,
}

impl PostLocator {
    /// Locator using the platform's selector cascade
    pub fn new(platform: PlatformProfile) -> Self {
        let strategies = platform
            .post_selectors
            .iter()
            .filter_map(|css| LocatorStrategy::from_css(css))
            .collect();
        Self {
            strategies,
            platform,
        }
    }

    /// Replace the cascade
    pub fn with_strategies(mut self, strategies: Vec<LocatorStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// The cascade, in evaluation order
    pub fn strategies(&self) -> &[LocatorStrategy] {
        &self.strategies
    }

    /// Best-available post containers in document order
    pub fn locate<'a>(&self, page: &'a ParsedPage) -> Vec<PostElement<'a>> {
        for strategy in &self.strategies {
            let found = strategy.matches(page);
            debug!("Selector '{}': {} elements", strategy.name(), found.len());
            if !found.is_empty() {
                return found.into_iter().map(|el| page.post(el)).collect();
            }
        }

        info!("No posts matched the selector cascade, scanning whole document");
        let found = self.scan_document(page);
        info!(
            "Found {} elements with external links that could be posts",
            found.len()
        );
        found
    }

    /// Match counts of every strategy, without stopping early
    pub fn diagnose(&self, page: &ParsedPage) -> Vec<StrategyHit> {
        self.strategies
            .iter()
            .map(|s| StrategyHit {
                strategy: s.name().to_string(),
                count: s.matches(page).len(),
            })
            .collect()
    }

    fn scan_document<'a>(&self, page: &'a ParsedPage) -> Vec<PostElement<'a>> {
        page.document()
            .select(any_element())
            .filter(|el| text_content(*el).encode_utf16().count() > FALLBACK_MIN_TEXT_CHARS)
            .filter(|el| self.has_external_link(page, *el))
            .map(|el| page.post(el))
            .collect()
    }

    fn has_external_link(&self, page: &ParsedPage, element: ElementRef<'_>) -> bool {
        element
            .select(anchor_selector())
            .filter(|a| a.id() != element.id())
            .filter_map(|a| a.value().attr("href"))
            .any(|href| {
                Url::parse(&page.resolve(href))
                    .ok()
                    .and_then(|u| u.host_str().map(|h| !self.platform.is_platform_host(h)))
                    .unwrap_or(false)
            })
    }
}

impl Default for PostLocator {
    fn default() -> Self {
        Self::new(PlatformProfile::x())
    }
}

fn any_element() -> &'static Selector {
    static ANY: OnceLock<Selector> = OnceLock::new();
    ANY.get_or_init(|| Selector::parse("*").expect("static selector"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> ParsedPage {
        ParsedPage::parse(html, Some(Url::parse("https://x.com/home").unwrap()))
    }

    #[test]
    fn test_default_cascade_order() {
        let locator = PostLocator::default();
        let names: Vec<_> = locator.strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], r#"article[data-testid="tweet"]"#);
        assert_eq!(names[7], r#"[role="article"]"#);
    }

    #[test]
    fn test_most_specific_tier_wins() {
        let page = parse(
            r#"<body>
                <article data-testid="tweet" id="a">one</article>
                <article id="b">plain</article>
                <article data-testid="tweet" id="c">two</article>
            </body>"#,
        );
        let posts = PostLocator::default().locate(&page);
        let ids: Vec<_> = posts
            .iter()
            .map(|p| p.element().value().attr("id").unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_later_tier_used_when_earlier_empty() {
        let page = parse(r#"<div data-testid="cellInnerDiv">cell</div><article>art</article>"#);
        let posts = PostLocator::default().locate(&page);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].element().value().name(), "div");
    }

    #[test]
    fn test_fallback_scan() {
        let page = parse(
            r#"<body><section><p id="post">Twenty five characters!! <a href="https://example.com/x">l</a></p></section></body>"#,
        );
        let posts = PostLocator::default().locate(&page);
        let ids: Vec<_> = posts
            .iter()
            .filter_map(|p| p.element().value().attr("id"))
            .collect();
        assert!(ids.contains(&"post"));
        // Ancestors carry the same text and link, and are kept in document order.
        let tags: Vec<_> = posts.iter().map(|p| p.element().value().name()).collect();
        assert_eq!(tags, vec!["html", "body", "section", "p"]);
    }

    #[test]
    fn test_fallback_ignores_platform_links_and_short_text() {
        let page = parse(
            r#"<body><div>Plenty of text in here, honestly <a href="https://t.co/abc">t</a> <a href="/home">h</a></div><p><a href="https://example.com">short</a></p></body>"#,
        );
        let posts = PostLocator::default().locate(&page);
        assert!(posts.iter().all(|p| p.element().value().name() != "div"));
        assert!(posts.iter().all(|p| p.element().value().name() != "p"));
    }

    #[test]
    fn test_fallback_length_counts_utf16_units() {
        // Ten emoji plus the link text is 11 chars but 21 UTF-16 units
        let page = parse(
            "<section><p id=\"emoji\">\u{1F525}\u{1F525}\u{1F525}\u{1F525}\u{1F525}\u{1F525}\u{1F525}\u{1F525}\u{1F525}\u{1F525}<a href=\"https://example.com/x\">l</a></p></section>",
        );
        let posts = PostLocator::default().locate(&page);
        assert!(posts
            .iter()
            .any(|p| p.element().value().attr("id") == Some("emoji")));
    }

    #[test]
    fn test_empty_document() {
        let page = parse("");
        assert!(PostLocator::default().locate(&page).is_empty());
    }

    #[test]
    fn test_diagnose_counts_every_strategy() {
        let page = parse(r#"<article role="article">a</article><article>b</article>"#);
        let hits = PostLocator::default().diagnose(&page);
        assert_eq!(hits.len(), 8);
        let article = hits.iter().find(|h| h.strategy == "article").unwrap();
        assert_eq!(article.count, 2);
        let role = hits
            .iter()
            .find(|h| h.strategy == r#"article[role="article"]"#)
            .unwrap();
        assert_eq!(role.count, 1);
    }

    #[test]
    fn test_custom_strategies() {
        let page = parse(r#"<li class="post">x</li><li>y</li>"#);
        let locator = PostLocator::default()
            .with_strategies(vec![LocatorStrategy::from_css("li.post").unwrap()]);
        assert_eq!(locator.locate(&page).len(), 1);
        assert!(LocatorStrategy::from_css("[[nope").is_none());
    }
}
