//! In-memory event store backend
//!
//! Keeps one bounded ring buffer per stream plus an event-id index
//! for O(1) resume lookups. Everything is lost on restart.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::store::{
    deliver_all, entries_after, next_event_id, EventEntry, EventMessage, EventStore,
    EventStoreConfig, EventStoreResult, EventId, StreamId,
};

#[derive(Default)]
struct Inner {
    /// Per-stream ring buffers, oldest event first
    streams: HashMap<StreamId, VecDeque<EventEntry>>,
    /// Event id -> owning stream, kept in sync with the buffers
    index: HashMap<EventId, StreamId>,
}

/// Volatile event store backed by per-stream ring buffers
pub struct MemoryEventStore {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl MemoryEventStore {
    pub fn new(config: &EventStoreConfig) -> Self {
        Self {
            // A stream must hold at least one event to be resumable
            capacity: config.capacity().max(1),
            inner: Mutex::new(Inner::default()),
        }
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, stream_id: &str, message: Value) -> EventStoreResult<EventId> {
        let event_id = next_event_id();
        let entry = EventEntry {
            event_id: event_id.clone(),
            stream_id: stream_id.to_string(),
            message,
        };

        let mut inner = self.inner.lock();
        let Inner { streams, index } = &mut *inner;

        let entries = streams.entry(stream_id.to_string()).or_default();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            if let Some(evicted) = entries.pop_front() {
                index.remove(&evicted.event_id);
                debug!(
                    stream = %stream_id,
                    event = %evicted.event_id,
                    "dropped oldest event at capacity"
                );
            }
        }
        index.insert(event_id.clone(), stream_id.to_string());

        Ok(event_id)
    }

    async fn replay_after(
        &self,
        last_event_id: &str,
        deliver: mpsc::Sender<EventMessage>,
    ) -> EventStoreResult<Option<StreamId>> {
        // Snapshot the tail under the lock, send after releasing it
        let (stream_id, tail) = {
            let inner = self.inner.lock();
            let Some(stream_id) = inner.index.get(last_event_id) else {
                return Ok(None);
            };
            let Some(entries) = inner.streams.get(stream_id) else {
                return Ok(None);
            };
            let Some(tail) = entries_after(entries, last_event_id) else {
                return Ok(None);
            };
            (stream_id.clone(), tail)
        };

        deliver_all(tail, &deliver).await?;
        Ok(Some(stream_id))
    }
}
