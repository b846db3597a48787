//! Event Store Module for Resumable Streams
//!
//! This module provides the storage layer behind stream resumability:
//! - `EventStore`: The storage trait (`append` + `replay_after`)
//! - `MemoryEventStore`: Per-stream ring buffers, lost on restart
//! - `DurableEventStore`: LMDB-backed log that survives restarts
//! - `CacheEventStore`: Expiring streams with a whole-stream idle TTL
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌───────────────┐    ┌──────────────────────┐
//! │ Outbound │───►│ append(stream,│───►│ evict oldest entries │
//! │ message  │    │ message) → id │    │ beyond capacity      │
//! └──────────┘    └───────────────┘    └──────────────────────┘
//!
//! Read Path (Reconnect):
//! ┌────────────────┐    ┌──────────────────┐
//! │ Last-Event-ID  │───►│ replay_after()   │───► live stream
//! │ from client    │    │ resends the tail │
//! └────────────────┘    └──────────────────┘
//! ```

mod cache;
mod durable;
mod memory;
mod store;

use std::sync::Arc;

pub use cache::CacheEventStore;
pub use durable::DurableEventStore;
pub use memory::MemoryEventStore;
pub use store::{
    BackendKind, EventEntry, EventId, EventMessage, EventStore, EventStoreConfig,
    EventStoreError, EventStoreResult, StreamId, DEFAULT_CACHE_CAPACITY,
    DEFAULT_STREAM_CAPACITY,
};

/// Construct the backend selected by the configuration
pub fn open(config: &EventStoreConfig) -> EventStoreResult<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryEventStore::new(config)),
        BackendKind::Durable => Arc::new(DurableEventStore::open(config)?),
        BackendKind::Cache => Arc::new(CacheEventStore::new(config)),
    };
    tracing::info!(
        backend = config.backend.as_str(),
        capacity = config.capacity(),
        "event store ready"
    );
    Ok(store)
}
