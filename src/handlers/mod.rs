//! Event handlers and the table that routes events to them.
//!
//! A handler is a transformation over `(event, store)`: it reads what it
//! needs, writes its entities, and returns. Events that reference contracts
//! the indexer does not track are reported as [`HandleOutcome::Ignored`]
//! without touching the store.

use crate::datasource::ChainReader;
use crate::domain::{Address, CollateralToken, EventTag, LoggedEvent, Pool};
use crate::error::IndexerError;
use crate::store::{EntityStore, StoreError, StoreExt};
use async_trait::async_trait;
use std::collections::HashMap;

pub mod factory;
pub mod swap;
pub mod transfer;

pub use factory::{
    CollateralValidityChangedHandler, MarketAddedHandler, MarketCreatedHandler,
    PoolCreatedHandler,
};
pub use swap::SwapHandler;
pub use transfer::TransferHandler;

/// Collaborators available to every handler.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub store: &'a dyn EntityStore,
    pub chain: &'a dyn ChainReader,
}

impl<'a> HandlerContext<'a> {
    pub fn new(store: &'a dyn EntityStore, chain: &'a dyn ChainReader) -> Self {
        Self { store, chain }
    }
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Applied,
    Ignored,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError>;
}

/// Routes each event to the handler registered for its tag.
pub struct DispatchTable {
    handlers: HashMap<EventTag, Box<dyn EventHandler>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Table with every protocol handler registered.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(EventTag::MarketAdded, MarketAddedHandler);
        table.register(EventTag::MarketCreated, MarketCreatedHandler);
        table.register(
            EventTag::CollateralValidityChanged,
            CollateralValidityChangedHandler,
        );
        table.register(EventTag::PoolCreated, PoolCreatedHandler);
        table.register(EventTag::Transfer, TransferHandler);
        table.register(EventTag::Swap, SwapHandler);
        table
    }

    /// Register `handler` for `tag`, replacing any previous one.
    pub fn register(&mut self, tag: EventTag, handler: impl EventHandler + 'static) {
        self.handlers.insert(tag, Box::new(handler));
    }

    pub fn handles(&self, tag: EventTag) -> bool {
        self.handlers.contains_key(&tag)
    }

    /// Events without a registered handler are ignored.
    pub async fn dispatch(
        &self,
        ctx: &HandlerContext<'_>,
        event: &LoggedEvent,
    ) -> Result<HandleOutcome, IndexerError> {
        match self.handlers.get(&event.tag()) {
            Some(handler) => handler.handle(ctx, event).await,
            None => Ok(HandleOutcome::Ignored),
        }
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pools and collateral contracts hold funds on behalf of users and never
/// own transaction legs themselves.
pub(crate) async fn is_protocol_contract(
    store: &dyn EntityStore,
    address: &Address,
) -> Result<bool, StoreError> {
    Ok(store.exists::<CollateralToken>(address.as_str()).await?
        || store.exists::<Pool>(address.as_str()).await?)
}
