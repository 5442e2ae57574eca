//! Document snapshots and post handles
//!
//! A [`PageSnapshot`] is the serialized HTML of a page at one instant. It is
//! `Send` and cheap to move between tasks. [`ParsedPage`] is its `scraper`
//! form; it is `!Send` and lives only between two suspension points.
//! [`PostElement`] borrows from a `ParsedPage`.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Serialized page content plus the URL it was rendered at
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    /// Full outer HTML of the document
    pub html: String,
    /// Page URL, used to resolve relative hrefs
    pub base_url: Option<Url>,
}

impl PageSnapshot {
    /// Create a snapshot
    pub fn new(html: impl Into<String>, base_url: Option<Url>) -> Self {
        Self {
            html: html.into(),
            base_url,
        }
    }

    /// Parse into a queryable document
    pub fn parse(&self) -> ParsedPage {
        ParsedPage::parse(&self.html, self.base_url.clone())
    }
}

/// A parsed document
pub struct ParsedPage {
    document: Html,
    base_url: Option<Url>,
}

impl ParsedPage {
    /// Parse an HTML document
    pub fn parse(html: &str, base_url: Option<Url>) -> Self {
        Self {
            document: Html::parse_document(html),
            base_url,
        }
    }

    /// The underlying `scraper` document
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Base URL, if known
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolve an href the way `HTMLAnchorElement.href` does.
    ///
    /// Unresolvable hrefs come back verbatim so the classifier can reject them.
    pub fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        let resolved = match &self.base_url {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        resolved.map(String::from).unwrap_or_else(|_| href.to_string())
    }

    /// Wrap an element of this page as a post
    pub fn post<'a>(&'a self, element: ElementRef<'a>) -> PostElement<'a> {
        PostElement {
            element,
            page: self,
        }
    }
}

pub(crate) fn anchor_selector() -> &'static Selector {
    static ANCHOR: OnceLock<Selector> = OnceLock::new();
    ANCHOR.get_or_init(|| Selector::parse("a[href]").expect("static selector"))
}

/// Full text content of an element (DOM `textContent`)
pub(crate) fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// A hyperlink drawn from a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Absolute URL (or the raw href when it cannot be resolved)
    pub url: String,
    /// Visible anchor text, untrimmed
    pub text: String,
}

impl LinkCandidate {
    /// Host of the candidate URL, lowercased, if it parses
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }
}

/// Handle to one post container in a parsed page
#[derive(Clone, Copy)]
pub struct PostElement<'a> {
    element: ElementRef<'a>,
    page: &'a ParsedPage,
}

impl<'a> PostElement<'a> {
    /// The wrapped element
    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    /// Hyperlinks inside the post, in document order
    pub fn links(&self) -> Vec<LinkCandidate> {
        self.descendants(anchor_selector())
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(LinkCandidate {
                    url: self.page.resolve(href),
                    text: text_content(a),
                })
            })
            .collect()
    }

    /// First descendant matching `selector`
    pub fn find(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.descendants(selector).next()
    }

    /// Full text content of the post
    pub fn text(&self) -> String {
        text_content(self.element)
    }

    // Descendants only, like Element.querySelectorAll.
    fn descendants<'s>(
        &self,
        selector: &'s Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 's
    where
        'a: 's,
    {
        let own_id = self.element.id();
        self.element
            .select(selector)
            .filter(move |e| e.id() != own_id)
    }
}

impl std::fmt::Debug for PostElement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostElement")
            .field("tag", &self.element.value().name())
            .field("testid", &self.element.value().attr("data-testid"))
            .finish()
    }
}
