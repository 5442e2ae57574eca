//! Feedmark - Reading List Harvester for Social Timelines
//!
//! This crate reads a rendered X (Twitter) timeline, finds the posts on it,
//! keeps the outbound links those posts share, and saves each one with a
//! title, the post text and the author into a reading list that can be
//! previewed, exported to Markdown, or served to AI agents over MCP.
//!
//! # Features
//!
//! - **Extraction Engine**: tiered post location with a whole-document fallback
//! - **Link Filtering**: shortener links kept, platform pages dropped, tracking stripped
//! - **Browser Access**: launch Chromium or attach to a signed-in session via CDP
//! - **Reading List**: JSON-backed store with preview and Markdown export
//! - **MCP Server**: stdio tools for agents
//!
//! # Architecture
//!
//! ```text
//! CLI / MCP ──▶ Extractor ──▶ PageSource (browser tab | saved HTML)
//!                  │
//!                  ▼ RecordSink (channel)
//!            Store writer ──▶ ReadingList ──▶ preview / Markdown export
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use feedmark::extraction::{Extractor, StaticPage};
//! use feedmark::storage::{spawn_store_writer, ReadingList};
//! use std::sync::Arc;
//! use tokio::sync::{mpsc, RwLock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = std::fs::read_to_string("timeline.html")?;
//!     let page = StaticPage::new(html, url::Url::parse("https://x.com/home").ok());
//!
//!     let store = Arc::new(RwLock::new(ReadingList::open("reading-list.json")?));
//!     let (tx, rx) = mpsc::unbounded_channel();
//!     let writer = spawn_store_writer(store.clone(), rx);
//!
//!     let report = Extractor::default().run(&page, &tx).await;
//!     drop(tx);
//!     writer.await?;
//!
//!     println!("Saved {} links", report.records_emitted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod error;
pub mod extraction;
pub mod mcp;
pub mod preview;
pub mod storage;

// Re-exports for convenience
pub use browser::BrowserController;
pub use config::{ExtractorConfig, PlatformProfile};
pub use error::{Error, Result};
pub use extraction::{ExtractedRecord, ExtractionReport, Extractor, PageSource, RecordSink};
pub use mcp::{McpServer, McpTool};
pub use storage::ReadingList;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
