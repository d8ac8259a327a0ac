//! Drives the indexer: pulls events from a feed, applies them in order and
//! records how far the store has progressed.

pub mod indexer;

pub use indexer::{IndexStats, Indexer};
