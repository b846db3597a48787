//! Durable event store backend on LMDB
//!
//! Two named databases live in one environment: `streams` maps a
//! stream id to its JSON-encoded ring buffer, `event_index` maps an
//! event id back to its stream. Append updates both inside a single
//! write transaction, so the index never points at an evicted event
//! and a crash between the two writes cannot happen. Stored streams
//! survive a server restart.

use std::collections::VecDeque;

use async_trait::async_trait;
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::store::{
    deliver_all, entries_after, next_event_id, EventEntry, EventMessage, EventStore,
    EventStoreConfig, EventStoreResult, EventId, StreamId,
};

const INDEX_DB: &str = "event_index";
const STREAMS_DB: &str = "streams";

/// Persistent event store backed by LMDB
pub struct DurableEventStore {
    env: Env,
    index: Database<Str, Str>,
    streams: Database<Str, Bytes>,
    capacity: usize,
}

impl DurableEventStore {
    /// Open (or create) the LMDB environment under the configured data directory
    pub fn open(config: &EventStoreConfig) -> EventStoreResult<Self> {
        let path = config.database_dir();
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size_mb * 1024 * 1024)
                .max_dbs(2)
                .open(&path)?
        };

        let mut wtxn = env.write_txn()?;
        let index = env.create_database(&mut wtxn, Some(INDEX_DB))?;
        let streams = env.create_database(&mut wtxn, Some(STREAMS_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            index,
            streams,
            capacity: config.capacity().max(1),
        })
    }
}

#[async_trait]
impl EventStore for DurableEventStore {
    async fn append(&self, stream_id: &str, message: Value) -> EventStoreResult<EventId> {
        let event_id = next_event_id();
        let entry = EventEntry {
            event_id: event_id.clone(),
            stream_id: stream_id.to_string(),
            message,
        };

        let mut wtxn = self.env.write_txn()?;

        let mut entries: VecDeque<EventEntry> = match self.streams.get(&wtxn, stream_id)? {
            Some(bytes) => serde_json::from_slice(bytes)?,
            None => VecDeque::new(),
        };
        entries.push_back(entry);
        while entries.len() > self.capacity {
            if let Some(evicted) = entries.pop_front() {
                self.index.delete(&mut wtxn, &evicted.event_id)?;
                debug!(
                    stream = %stream_id,
                    event = %evicted.event_id,
                    "dropped oldest event at capacity"
                );
            }
        }

        self.streams
            .put(&mut wtxn, stream_id, &serde_json::to_vec(&entries)?)?;
        self.index.put(&mut wtxn, &event_id, stream_id)?;
        wtxn.commit()?;

        Ok(event_id)
    }

    async fn replay_after(
        &self,
        last_event_id: &str,
        deliver: mpsc::Sender<EventMessage>,
    ) -> EventStoreResult<Option<StreamId>> {
        // Read transactions are not Send, keep one inside this block only
        let found = {
            let rtxn = self.env.read_txn()?;
            let Some(stream_id) = self.index.get(&rtxn, last_event_id)? else {
                return Ok(None);
            };
            let stream_id = stream_id.to_string();
            let Some(bytes) = self.streams.get(&rtxn, &stream_id)? else {
                return Ok(None);
            };
            let entries: VecDeque<EventEntry> = serde_json::from_slice(bytes)?;
            entries_after(&entries, last_event_id).map(|tail| (stream_id, tail))
        };

        let Some((stream_id, tail)) = found else {
            return Ok(None);
        };
        deliver_all(tail, &deliver).await?;
        Ok(Some(stream_id))
    }
}
