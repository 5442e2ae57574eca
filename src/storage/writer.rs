use super::ReadingList;
use crate::extraction::ExtractedRecord;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Drain a record channel into the reading list.
///
/// Records already queued are saved together, so a pass that emits its
/// links in one burst costs one file write. The task ends when every sender
/// is dropped and yields the number of records saved. Failed writes are
/// logged and skipped.
pub fn spawn_store_writer(
    store: Arc<RwLock<ReadingList>>,
    mut records: UnboundedReceiver<ExtractedRecord>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut saved = 0;
        while let Some(first) = records.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = records.try_recv() {
                batch.push(next);
            }

            let count = batch.len();
            match store.write().await.append_batch(batch) {
                Ok(()) => saved += count,
                Err(e) => warn!("Error saving {} URLs: {}", count, e),
            }
        }
        debug!("Store writer finished after {} records", saved);
        saved
    })
}
