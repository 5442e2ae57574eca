//! Link extraction engine
//!
//! This module finds post containers in a rendered timeline, keeps the
//! outbound links inside them, and turns each one into an
//! [`ExtractedRecord`] with a title, the post text and the author.

pub mod classifier;
pub mod dom;
pub mod locator;
pub mod metadata;
pub mod orchestrator;
pub mod record;
pub mod source;

pub use classifier::UrlClassifier;
pub use dom::{LinkCandidate, PageSnapshot, ParsedPage, PostElement};
pub use locator::{LocatorStrategy, PostLocator, StrategyHit};
pub use metadata::{MetadataDeriver, UNKNOWN_AUTHOR, UNTITLED_LINK};
pub use orchestrator::{ExtractionReport, Extractor};
pub use record::{ExtractedRecord, RecordSink};
pub use source::{PageSource, StaticPage};
