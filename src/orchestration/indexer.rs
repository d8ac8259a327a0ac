use crate::datasource::{ChainReader, EventFeed};
use crate::domain::OrderingKey;
use crate::error::IndexerError;
use crate::handlers::{DispatchTable, HandleOutcome, HandlerContext};
use crate::store::EntityStore;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Counters for one indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Events that changed the store.
    pub handled: u64,
    /// Events already covered by the stored cursor.
    pub skipped: u64,
    /// Events about contracts the indexer does not track.
    pub ignored: u64,
}

impl IndexStats {
    pub fn total(&self) -> u64 {
        self.handled + self.skipped + self.ignored
    }
}

/// Applies events strictly one at a time in canonical chain order.
pub struct Indexer {
    store: Arc<dyn EntityStore>,
    chain: Arc<dyn ChainReader>,
    dispatch: DispatchTable,
}

impl Indexer {
    pub fn new(store: Arc<dyn EntityStore>, chain: Arc<dyn ChainReader>) -> Self {
        Self {
            store,
            chain,
            dispatch: DispatchTable::standard(),
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Consume `feed` to the end.
    ///
    /// Events at or before the stored cursor are skipped, so a restarted run
    /// over the same feed resumes where the last one stopped. The cursor is
    /// advanced after every applied event. Any failure aborts the run.
    pub async fn run<F>(&self, feed: &mut F) -> Result<IndexStats, IndexerError>
    where
        F: EventFeed + ?Sized,
    {
        let resume_from = self.store.load_cursor().await?;
        match resume_from {
            Some(cursor) => info!(cursor = %cursor, "resuming indexing"),
            None => info!("indexing from the start of the feed"),
        }

        let ctx = HandlerContext::new(self.store.as_ref(), self.chain.as_ref());
        let mut stats = IndexStats::default();
        let mut previous: Option<OrderingKey> = None;
        let mut events = feed.events();

        while let Some(next) = events.next().await {
            let event = next?;
            let key = event.meta.ordering_key();

            if let Some(previous) = previous {
                if key <= previous {
                    error!(previous = %previous, got = %key, "event feed out of order");
                    return Err(IndexerError::OutOfOrder { previous, got: key });
                }
            }
            previous = Some(key);

            if resume_from.is_some_and(|cursor| key <= cursor) {
                stats.skipped += 1;
                continue;
            }

            let outcome = self
                .dispatch
                .dispatch(&ctx, &event)
                .await
                .inspect_err(|e| {
                    error!(event = %key, tag = %event.tag(), error = %e, "handler failed")
                })?;
            match outcome {
                HandleOutcome::Applied => stats.handled += 1,
                HandleOutcome::Ignored => {
                    debug!(event = %key, tag = %event.tag(), "event ignored");
                    stats.ignored += 1;
                }
            }
            self.store.store_cursor(key).await?;
        }

        info!(
            handled = stats.handled,
            ignored = stats.ignored,
            skipped = stats.skipped,
            "indexing run finished"
        );
        Ok(stats)
    }
}
