//! Event store core - shared types, configuration and the storage trait
//!
//! Streamable HTTP sessions persist every outbound message here so a
//! client that reconnects with a `Last-Event-ID` header can resume the
//! stream without losing messages.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Opaque identifier assigned to each stored event
pub type EventId = String;

/// Opaque identifier of the stream an event belongs to
pub type StreamId = String;

/// Default number of retained events per stream
pub const DEFAULT_STREAM_CAPACITY: usize = 100;

/// Default retained events per stream for the cache backend
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Default LMDB map size in megabytes
pub const DEFAULT_MAP_SIZE_MB: usize = 128;

/// Default idle TTL for cache-backed streams
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// One stored event: the message plus the ids that locate it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    #[serde(rename = "streamId")]
    pub stream_id: StreamId,
    pub message: Value,
}

/// Event handed to a replay consumer
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub event_id: EventId,
    pub message: Value,
}

/// Generate a fresh opaque event id
pub fn next_event_id() -> EventId {
    format!("evt_{}", uuid::Uuid::new_v4().simple())
}

/// Which storage backend to run the event log on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Per-stream ring buffers in process memory
    Memory,
    /// LMDB-backed log that survives restarts
    Durable,
    /// In-process TTL cache, streams expire after idle time
    Cache,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memory" => Some(Self::Memory),
            "durable" => Some(Self::Durable),
            "cache" => Some(Self::Cache),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Durable => "durable",
            Self::Cache => "cache",
        }
    }
}

/// Configuration for the event store
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Backend selected at construction time
    pub backend: BackendKind,
    /// Retained events per stream; `None` uses the backend default
    pub max_events_per_stream: Option<usize>,
    /// Data directory for the durable backend
    pub data_dir: PathBuf,
    /// LMDB map size in megabytes
    pub map_size_mb: usize,
    /// Idle TTL for cache-backed streams
    pub stream_idle_ttl: Duration,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            max_events_per_stream: None,
            data_dir: PathBuf::from("data"),
            map_size_mb: DEFAULT_MAP_SIZE_MB,
            stream_idle_ttl: DEFAULT_IDLE_TTL,
        }
    }
}

impl EventStoreConfig {
    /// Create config for a specific backend
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Default::default()
        }
    }

    /// Set the per-stream capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.max_events_per_stream = Some(capacity);
        self
    }

    /// Set the data directory for the durable backend
    pub fn with_data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Set the idle TTL for cache-backed streams
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.stream_idle_ttl = ttl;
        self
    }

    /// Set the LMDB map size in megabytes
    pub fn with_map_size_mb(mut self, map_size_mb: usize) -> Self {
        self.map_size_mb = map_size_mb;
        self
    }

    /// Read configuration from environment variables
    ///
    /// Recognized variables:
    /// - `EVENT_STORE_BACKEND`: "memory" (default), "durable" or "cache"
    /// - `EVENT_STORE_DIR`: data directory for the durable backend
    /// - `EVENT_STORE_MAP_SIZE_MB`: LMDB map size
    /// - `MAX_EVENTS_PER_STREAM`: retained events per stream
    /// - `STREAM_IDLE_TTL_SECS`: idle TTL for cache-backed streams
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("EVENT_STORE_BACKEND") {
            match BackendKind::parse(&raw) {
                Some(backend) => config.backend = backend,
                None => {
                    tracing::warn!(backend = %raw, "unknown event store backend, using memory");
                }
            }
        }
        if let Ok(dir) = std::env::var("EVENT_STORE_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(mb) = read_env_usize("EVENT_STORE_MAP_SIZE_MB") {
            config.map_size_mb = mb;
        }
        if let Some(capacity) = read_env_usize("MAX_EVENTS_PER_STREAM") {
            config.max_events_per_stream = Some(capacity);
        }
        if let Some(secs) = read_env_usize("STREAM_IDLE_TTL_SECS") {
            config.stream_idle_ttl = Duration::from_secs(secs as u64);
        }

        config
    }

    /// Per-stream capacity with the backend default applied
    pub fn capacity(&self) -> usize {
        self.max_events_per_stream.unwrap_or(match self.backend {
            BackendKind::Cache => DEFAULT_CACHE_CAPACITY,
            _ => DEFAULT_STREAM_CAPACITY,
        })
    }

    /// Path of the LMDB environment directory
    pub fn database_dir(&self) -> PathBuf {
        self.data_dir.join("events.mdb")
    }
}

fn read_env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

/// Result type for event store operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in event store operations
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] heed::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("replay consumer hung up")]
    DeliveryClosed,
    #[error("event store unavailable: {0}")]
    Unavailable(String),
}

/// Storage interface for resumable streams
///
/// Implementations keep a bounded per-stream log. An event id handed
/// out by [`append`](EventStore::append) stays resolvable until the
/// event is evicted; after that, [`replay_after`](EventStore::replay_after)
/// treats it like any unknown id and returns `Ok(None)`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Store a message on a stream and return its event id
    async fn append(&self, stream_id: &str, message: Value) -> EventStoreResult<EventId>;

    /// Resend every event stored after `last_event_id`
    ///
    /// Events are sent to `deliver` in storage order, one at a time.
    /// Returns the id of the stream the events came from, or `Ok(None)`
    /// when `last_event_id` is unknown or already evicted. Backend
    /// failures surface as errors, never as a silent `None`.
    async fn replay_after(
        &self,
        last_event_id: &str,
        deliver: mpsc::Sender<EventMessage>,
    ) -> EventStoreResult<Option<StreamId>>;
}

/// Collect the events stored after `last_event_id` in one stream
///
/// Returns `None` when the id is not in the stream. An empty vector
/// means the id was the newest event.
pub(crate) fn entries_after(
    entries: &VecDeque<EventEntry>,
    last_event_id: &str,
) -> Option<Vec<EventMessage>> {
    let position = entries
        .iter()
        .position(|entry| entry.event_id == last_event_id)?;
    Some(
        entries
            .iter()
            .skip(position + 1)
            .map(|entry| EventMessage {
                event_id: entry.event_id.clone(),
                message: entry.message.clone(),
            })
            .collect(),
    )
}

/// Send collected events to the replay consumer, in order
pub(crate) async fn deliver_all(
    events: Vec<EventMessage>,
    deliver: &mpsc::Sender<EventMessage>,
) -> EventStoreResult<()> {
    for event in events {
        deliver
            .send(event)
            .await
            .map_err(|_| EventStoreError::DeliveryClosed)?;
    }
    Ok(())
}
