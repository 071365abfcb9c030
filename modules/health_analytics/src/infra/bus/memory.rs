use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::ports::bus::{BusError, InboundMessage, TopicReader};

#[derive(Debug, Clone)]
pub struct MemoryMessage {
    pub offset: u64,
    key: String,
    payload: Bytes,
}

impl InboundMessage for MemoryMessage {
    fn key(&self) -> &str {
        &self.key
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Producer half of an in-process topic.
#[derive(Clone)]
pub struct MemoryPublisher {
    topic: String,
    tx: mpsc::UnboundedSender<MemoryMessage>,
    next_offset: Arc<AtomicU64>,
}

impl MemoryPublisher {
    pub fn publish(&self, key: &str, payload: impl Into<Bytes>) -> Result<u64, BusError> {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        self.tx
            .send(MemoryMessage {
                offset,
                key: key.to_string(),
                payload: payload.into(),
            })
            .map_err(|_| BusError::closed(&self.topic))?;
        Ok(offset)
    }

    pub fn publish_json<T: Serialize>(&self, key: &str, body: &T) -> Result<u64, BusError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| BusError::fetch(&self.topic, format!("encode: {e}")))?;
        self.publish(key, payload)
    }
}

/// Shared view of which offsets a reader committed.
#[derive(Clone, Default)]
pub struct CommitLog(Arc<Mutex<Vec<u64>>>);

impl CommitLog {
    pub fn offsets(&self) -> Vec<u64> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Consumer half of an in-process topic. Fetch fails with `Closed` once every
/// publisher is dropped and the backlog is drained.
pub struct MemoryTopicReader {
    topic: String,
    rx: mpsc::UnboundedReceiver<MemoryMessage>,
    commits: CommitLog,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryTopicReader {
    pub fn commit_log(&self) -> CommitLog {
        self.commits.clone()
    }

    /// Make every later commit fail; returns the switch.
    pub fn commit_failure_switch(&self) -> Arc<AtomicBool> {
        self.fail_commits.clone()
    }
}

#[async_trait]
impl TopicReader for MemoryTopicReader {
    type Message = MemoryMessage;

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn fetch(&mut self) -> Result<MemoryMessage, BusError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| BusError::closed(&self.topic))
    }

    async fn commit(&mut self, msg: &MemoryMessage) -> Result<(), BusError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(BusError::commit(&self.topic, "commit rejected"));
        }
        self.commits.0.lock().push(msg.offset);
        Ok(())
    }
}

/// Create a connected publisher/reader pair for `topic`.
pub fn topic(name: &str) -> (MemoryPublisher, MemoryTopicReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        MemoryPublisher {
            topic: name.to_string(),
            tx,
            next_offset: Arc::new(AtomicU64::new(0)),
        },
        MemoryTopicReader {
            topic: name.to_string(),
            rx,
            commits: CommitLog::default(),
            fail_commits: Arc::new(AtomicBool::new(false)),
        },
    )
}
