//! Extraction pass
//!
//! One pass is a linear pipeline:
//!
//! ```text
//! settle ──▶ snapshot ──▶ locate ──┬─ posts ──────────────────────────────▶ harvest
//!                                  └─ none ──▶ scroll ──▶ settle ──▶ snapshot ──▶ locate ──▶ harvest
//! ```
//!
//! Harvesting classifies every link of every post and emits one record per
//! kept link. Nothing in a pass fails outward; problems reduce the record
//! count and are logged.

use super::classifier::UrlClassifier;
use super::dom::{LinkCandidate, PageSnapshot, PostElement};
use super::locator::PostLocator;
use super::metadata::MetadataDeriver;
use super::record::{ExtractedRecord, RecordSink};
use super::source::PageSource;
use crate::config::ExtractorConfig;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn, Level};

/// Counters for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    /// Post containers found by the final locate
    pub posts_found: usize,
    /// Hyperlinks inspected
    pub links_seen: usize,
    /// Records handed to the sink
    pub records_emitted: usize,
    /// Records the sink refused
    pub emit_failures: usize,
    /// Whether the scroll-and-retry step ran
    pub scrolled: bool,
}

impl ExtractionReport {
    /// True when even the retry found no posts
    pub fn no_posts_found(&self) -> bool {
        self.posts_found == 0
    }
}

/// Runs extraction passes against a page
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    locator: PostLocator,
    classifier: UrlClassifier,
    deriver: MetadataDeriver,
}

impl Extractor {
    /// Create an extractor
    pub fn new(config: ExtractorConfig) -> Self {
        let platform = config.platform.clone();
        Self {
            locator: PostLocator::new(platform.clone()),
            classifier: UrlClassifier::new(platform.clone()),
            deriver: MetadataDeriver::new(&platform),
            config,
        }
    }

    /// Swap the post locator
    pub fn with_locator(mut self, locator: PostLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run one pass, pushing records into `sink` as they are found
    #[instrument(skip_all)]
    pub async fn run<P, S>(&self, page: &P, sink: &S) -> ExtractionReport
    where
        P: PageSource + ?Sized,
        S: RecordSink + ?Sized,
    {
        info!("Starting URL extraction");
        tokio::time::sleep(self.config.initial_settle).await;

        let snapshot = Self::take_snapshot(page).await;
        let mut report = self.harvest(&snapshot, sink);

        if report.no_posts_found() {
            info!("No posts found, scrolling and waiting");
            if let Err(e) = page.scroll_to_bottom().await {
                warn!("Scroll failed: {}", e);
            }
            tokio::time::sleep(self.config.scroll_settle).await;

            let snapshot = Self::take_snapshot(page).await;
            report = self.harvest(&snapshot, sink);
            report.scrolled = true;
            info!("After scroll, found {} posts", report.posts_found);
        }

        info!(
            posts = report.posts_found,
            links = report.links_seen,
            failures = report.emit_failures,
            "Extracted {} URLs",
            report.records_emitted
        );
        report
    }

    /// Locate posts in one snapshot and emit a record per kept link
    pub fn harvest<S>(&self, snapshot: &PageSnapshot, sink: &S) -> ExtractionReport
    where
        S: RecordSink + ?Sized,
    {
        let page = snapshot.parse();
        if tracing::enabled!(Level::DEBUG) {
            for hit in self.locator.diagnose(&page) {
                debug!("{}: {} elements", hit.strategy, hit.count);
            }
        }

        let posts = self.locator.locate(&page);
        let mut report = ExtractionReport {
            posts_found: posts.len(),
            ..Default::default()
        };

        for (index, post) in posts.iter().enumerate() {
            let links = post.links();
            debug!("Post {}/{}: {} links", index + 1, posts.len(), links.len());

            for link in links {
                report.links_seen += 1;
                if !self.classifier.is_eligible(&link.url) {
                    continue;
                }

                match sink.emit(self.record_for(&link, post)) {
                    Ok(()) => report.records_emitted += 1,
                    Err(e) => {
                        warn!("Error sending URL {} to store: {}", link.url, e);
                        report.emit_failures += 1;
                    }
                }
            }
        }

        report
    }

    fn record_for(&self, link: &LinkCandidate, post: &PostElement<'_>) -> ExtractedRecord {
        ExtractedRecord {
            url: self.classifier.clean(&link.url),
            title: self.deriver.title(link, post),
            post_text: self.deriver.post_text(post),
            author: self.deriver.author(post),
            timestamp: Utc::now(),
        }
    }

    async fn take_snapshot<P: PageSource + ?Sized>(page: &P) -> PageSnapshot {
        match page.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Could not read page, treating it as empty: {}", e);
                PageSnapshot::default()
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}
