//! Event Store Replay Integration Tests
//!
//! Exercises every backend through the `EventStore` trait object the
//! transports use, covering:
//! - Append and replay round trips
//! - Unknown or evicted resume IDs
//! - Durable recovery after a process restart

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;

use market_stream::event_store::{
    self, EventId, EventMessage, EventStore, EventStoreConfig, StreamId,
};
use market_stream::BackendKind;

fn memory_store() -> Arc<dyn EventStore> {
    event_store::open(&EventStoreConfig::new(BackendKind::Memory)).expect("memory store")
}

fn cache_store() -> Arc<dyn EventStore> {
    event_store::open(&EventStoreConfig::new(BackendKind::Cache)).expect("cache store")
}

fn durable_store(dir: &TempDir) -> Arc<dyn EventStore> {
    let config = EventStoreConfig::new(BackendKind::Durable).with_data_dir(dir.path());
    event_store::open(&config).expect("durable store")
}

/// Drain a full replay into a vec
async fn collect_replay(
    store: &Arc<dyn EventStore>,
    last_event_id: &str,
) -> (Option<StreamId>, Vec<EventMessage>) {
    let (tx, mut rx) = mpsc::channel(64);
    let stream_id = store
        .replay_after(last_event_id, tx)
        .await
        .expect("replay should not fail");

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    (stream_id, events)
}

async fn append_sequence(
    store: &Arc<dyn EventStore>,
    stream_id: &str,
    count: usize,
) -> Vec<EventId> {
    let mut ids = Vec::with_capacity(count);
    for seq in 0..count {
        let id = store
            .append(stream_id, json!({"seq": seq}))
            .await
            .expect("append should succeed");
        ids.push(id);
    }
    ids
}

#[tokio::test]
async fn test_all_backends_replay_from_middle() {
    let durable_dir = TempDir::new().unwrap();
    let stores: Vec<(&str, Arc<dyn EventStore>)> = vec![
        ("memory", memory_store()),
        ("cache", cache_store()),
        ("durable", durable_store(&durable_dir)),
    ];

    for (backend, store) in stores {
        let ids = append_sequence(&store, "stream-a", 5).await;

        let (stream_id, events) = collect_replay(&store, &ids[1]).await;
        assert_eq!(
            stream_id.as_deref(),
            Some("stream-a"),
            "{backend} should name the owning stream"
        );
        assert_eq!(events.len(), 3, "{backend} should replay the tail");
        assert_eq!(events[0].event_id, ids[2]);
        assert_eq!(events[2].event_id, ids[4]);
        assert_eq!(events[0].message["seq"], 2);
    }
}

#[tokio::test]
async fn test_all_backends_treat_unknown_id_as_no_stream() {
    let durable_dir = TempDir::new().unwrap();
    let stores: Vec<(&str, Arc<dyn EventStore>)> = vec![
        ("memory", memory_store()),
        ("cache", cache_store()),
        ("durable", durable_store(&durable_dir)),
    ];

    for (backend, store) in stores {
        append_sequence(&store, "stream-a", 3).await;

        let (stream_id, events) = collect_replay(&store, "evt_never_issued").await;
        assert!(stream_id.is_none(), "{backend} should report no stream");
        assert!(events.is_empty(), "{backend} should deliver nothing");
    }
}

#[tokio::test]
async fn test_replay_from_newest_event_is_empty() {
    let store = memory_store();
    let ids = append_sequence(&store, "stream-a", 4).await;

    let (stream_id, events) = collect_replay(&store, ids.last().unwrap()).await;
    assert_eq!(stream_id.as_deref(), Some("stream-a"));
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_streams_stay_isolated() {
    let store = memory_store();
    let a_ids = append_sequence(&store, "stream-a", 3).await;
    append_sequence(&store, "stream-b", 3).await;

    let (stream_id, events) = collect_replay(&store, &a_ids[0]).await;
    assert_eq!(stream_id.as_deref(), Some("stream-a"));
    assert_eq!(events.len(), 2);
    for event in &events {
        assert!(a_ids.contains(&event.event_id));
    }
}

#[tokio::test]
async fn test_eviction_invalidates_old_resume_ids() {
    let config = EventStoreConfig::new(BackendKind::Memory).with_capacity(3);
    let store = event_store::open(&config).expect("memory store");

    let ids = append_sequence(&store, "stream-a", 6).await;

    // The three oldest fell out of the window; their IDs resume nothing
    let (stream_id, events) = collect_replay(&store, &ids[0]).await;
    assert!(stream_id.is_none());
    assert!(events.is_empty());

    // The newest retained IDs still replay what follows them
    let (stream_id, events) = collect_replay(&store, &ids[3]).await;
    assert_eq!(stream_id.as_deref(), Some("stream-a"));
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_durable_store_resumes_after_restart() {
    let dir = TempDir::new().unwrap();
    let ids;

    // First process lifetime
    {
        let store = durable_store(&dir);
        ids = append_sequence(&store, "stream-a", 4).await;
    }

    // Second process lifetime sees everything the first one wrote
    let store = durable_store(&dir);
    let (stream_id, events) = collect_replay(&store, &ids[0]).await;
    assert_eq!(stream_id.as_deref(), Some("stream-a"));
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].message["seq"], 1);

    // And appends keep extending the same stream
    let new_id = store
        .append("stream-a", json!({"seq": 99}))
        .await
        .unwrap();
    let (_, events) = collect_replay(&store, &ids[2]).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events.last().unwrap().event_id, new_id);
}

#[tokio::test]
async fn test_event_ids_are_unique_across_streams() {
    let store = memory_store();
    let a_ids = append_sequence(&store, "stream-a", 10).await;
    let b_ids = append_sequence(&store, "stream-b", 10).await;

    let mut all: Vec<&EventId> = a_ids.iter().chain(b_ids.iter()).collect();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 20);
}
