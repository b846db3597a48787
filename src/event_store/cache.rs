//! Cache event store backend
//!
//! Streams live in an in-process map with one expiry deadline per
//! stream. Every append pushes the whole stream's deadline out by the
//! configured idle TTL, so an active session never expires mid-use
//! while an abandoned one is reclaimed as a unit.
//!
//! There is no event-id index: resume lookups scan the live streams
//! instead. That keeps expiry a single map-entry removal with nothing
//! to keep in sync, at the cost of a linear scan per resume. Session
//! counts on one server stay small enough for the scan not to matter.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::store::{
    deliver_all, entries_after, next_event_id, EventEntry, EventMessage, EventStore,
    EventStoreConfig, EventStoreResult, EventId, StreamId,
};

struct CachedStream {
    entries: VecDeque<EventEntry>,
    expires_at: Instant,
}

/// Expiring event store for short-lived sessions
pub struct CacheEventStore {
    capacity: usize,
    ttl: Duration,
    streams: Mutex<HashMap<StreamId, CachedStream>>,
}

impl CacheEventStore {
    pub fn new(config: &EventStoreConfig) -> Self {
        Self {
            capacity: config.capacity().max(1),
            ttl: config.stream_idle_ttl,
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Drop streams whose deadline has passed
    fn purge_expired(streams: &mut HashMap<StreamId, CachedStream>, now: Instant) {
        streams.retain(|stream_id, stream| {
            let live = stream.expires_at > now;
            if !live {
                debug!(stream = %stream_id, "stream expired after idle TTL");
            }
            live
        });
    }
}

#[async_trait]
impl EventStore for CacheEventStore {
    async fn append(&self, stream_id: &str, message: Value) -> EventStoreResult<EventId> {
        let event_id = next_event_id();
        let entry = EventEntry {
            event_id: event_id.clone(),
            stream_id: stream_id.to_string(),
            message,
        };

        let now = Instant::now();
        let mut streams = self.streams.lock();
        Self::purge_expired(&mut streams, now);

        let stream = streams
            .entry(stream_id.to_string())
            .or_insert_with(|| CachedStream {
                entries: VecDeque::new(),
                expires_at: now + self.ttl,
            });
        stream.entries.push_back(entry);
        while stream.entries.len() > self.capacity {
            if let Some(evicted) = stream.entries.pop_front() {
                debug!(
                    stream = %stream_id,
                    event = %evicted.event_id,
                    "dropped oldest event at capacity"
                );
            }
        }
        // Any write keeps the whole stream alive for another TTL window
        stream.expires_at = now + self.ttl;

        Ok(event_id)
    }

    async fn replay_after(
        &self,
        last_event_id: &str,
        deliver: mpsc::Sender<EventMessage>,
    ) -> EventStoreResult<Option<StreamId>> {
        let found = {
            let now = Instant::now();
            let mut streams = self.streams.lock();
            Self::purge_expired(&mut streams, now);

            streams.iter().find_map(|(stream_id, stream)| {
                entries_after(&stream.entries, last_event_id)
                    .map(|tail| (stream_id.clone(), tail))
            })
        };

        let Some((stream_id, tail)) = found else {
            return Ok(None);
        };
        deliver_all(tail, &deliver).await?;
        Ok(Some(stream_id))
    }
}
