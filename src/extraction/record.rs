//! Extracted records and the one-way sink they are pushed into

use crate::error::TransportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// One kept link, ready for the reading list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    /// Cleaned absolute URL
    pub url: String,
    /// Display title; never empty
    pub title: String,
    /// Body text of the post the link came from
    pub post_text: String,
    /// Author handle or label
    pub author: String,
    /// When the record was extracted
    pub timestamp: DateTime<Utc>,
}

/// Fire-and-forget destination for records
///
/// Implementations must not block; delivery is at most once.
pub trait RecordSink: Send + Sync {
    /// Push one record
    fn emit(&self, record: ExtractedRecord) -> Result<(), TransportError>;
}

impl RecordSink for UnboundedSender<ExtractedRecord> {
    fn emit(&self, record: ExtractedRecord) -> Result<(), TransportError> {
        self.send(record).map_err(|_| TransportError::ChannelClosed)
    }
}

impl<S: RecordSink + ?Sized> RecordSink for std::sync::Arc<S> {
    fn emit(&self, record: ExtractedRecord) -> Result<(), TransportError> {
        (**self).emit(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn record() -> ExtractedRecord {
        ExtractedRecord {
            url: "https://example.com/".to_string(),
            title: "Example".to_string(),
            post_text: "Look".to_string(),
            author: "@someone".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["postText"], "Look");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
        assert!(json.get("post_text").is_none());
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(record()).unwrap();
        assert_eq!(rx.try_recv().unwrap().title, "Example");
    }

    #[test]
    fn test_channel_sink_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert_eq!(tx.emit(record()), Err(TransportError::ChannelClosed));
    }
}
