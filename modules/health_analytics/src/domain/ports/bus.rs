use async_trait::async_trait;
use thiserror::Error;

/// One message pulled from a topic.
pub trait InboundMessage: Send + Sync {
    /// Routing key, `"<entity>.<operation>"`.
    fn key(&self) -> &str;
    /// Raw JSON body.
    fn payload(&self) -> &[u8];
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("fetch from '{topic}' failed: {message}")]
    Fetch { topic: String, message: String },

    #[error("commit on '{topic}' failed: {message}")]
    Commit { topic: String, message: String },

    #[error("topic '{topic}' closed")]
    Closed { topic: String },
}

impl BusError {
    pub fn fetch(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            topic: topic.into(),
            message: message.into(),
        }
    }

    pub fn commit(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Commit {
            topic: topic.into(),
            message: message.into(),
        }
    }

    pub fn closed(topic: impl Into<String>) -> Self {
        Self::Closed {
            topic: topic.into(),
        }
    }
}

/// Port for the ingest pipeline: a sequential cursor over one topic within a consumer group.
#[async_trait]
pub trait TopicReader: Send + Sync {
    type Message: InboundMessage;

    fn topic(&self) -> &str;

    /// Wait for the next message.
    async fn fetch(&mut self) -> Result<Self::Message, BusError>;

    /// Mark `msg` as processed so the group does not see it again.
    async fn commit(&mut self, msg: &Self::Message) -> Result<(), BusError>;
}
