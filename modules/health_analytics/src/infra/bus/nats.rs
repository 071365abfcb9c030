use async_nats::jetstream::{
    self,
    consumer::{pull, AckPolicy, PullConsumer},
};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::info;

use crate::contract::EntityKind;
use crate::domain::ports::bus::{BusError, InboundMessage, TopicReader};

/// Header carrying the routing key; the subject is used when it is absent.
pub const KEY_HEADER: &str = "Message-Key";

/// Open a NATS connection, optionally authenticated.
pub async fn connect(
    url: &str,
    user: Option<&str>,
    password: Option<&str>,
) -> Result<async_nats::Client, BusError> {
    info!("Connecting to NATS at {}", url);
    let options = match (user, password) {
        (Some(u), Some(p)) => async_nats::ConnectOptions::with_user_and_password(u.into(), p.into()),
        _ => async_nats::ConnectOptions::new(),
    };
    options
        .connect(url)
        .await
        .map_err(|e| BusError::fetch(url, format!("failed to connect: {e}")))
}

/// JetStream stream name for a topic (stream names may not contain dots).
pub fn stream_name(topic: &str) -> String {
    topic.replace('.', "_").to_ascii_uppercase()
}

/// Routing key for a message published without a key header.
///
/// The topic part of the subject is replaced by the kind's key prefix, so a
/// renamed topic (`health.genetic.create`) still routes as `genetic_data.create`.
pub fn key_from_subject(topic: &str, key_prefix: &str, subject: &str) -> String {
    match subject
        .strip_prefix(topic)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        Some(op) => format!("{key_prefix}.{op}"),
        None => subject.to_string(),
    }
}

pub struct NatsMessage {
    key: String,
    inner: jetstream::Message,
}

impl NatsMessage {
    fn new(inner: jetstream::Message, topic: &str, key_prefix: &str) -> Self {
        let key = inner
            .headers
            .as_ref()
            .and_then(|h| h.get(KEY_HEADER))
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| key_from_subject(topic, key_prefix, inner.subject.as_str()));
        Self { key, inner }
    }
}

impl InboundMessage for NatsMessage {
    fn key(&self) -> &str {
        &self.key
    }

    fn payload(&self) -> &[u8] {
        &self.inner.payload
    }
}

/// Durable pull consumer over `<topic>.>`; one per consumer group.
pub struct NatsTopicReader {
    topic: String,
    key_prefix: &'static str,
    messages: pull::Stream,
}

impl NatsTopicReader {
    pub async fn subscribe(
        js: &jetstream::Context,
        topic: &str,
        kind: EntityKind,
    ) -> Result<Self, BusError> {
        let group = kind.consumer_group();
        let stream = js
            .get_or_create_stream(jetstream::stream::Config {
                name: stream_name(topic),
                subjects: vec![format!("{topic}.>")],
                ..Default::default()
            })
            .await
            .map_err(|e| BusError::fetch(topic, format!("failed to create stream: {e}")))?;

        let consumer: PullConsumer = stream
            .get_or_create_consumer(
                group,
                pull::Config {
                    durable_name: Some(group.to_string()),
                    ack_policy: AckPolicy::Explicit,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| BusError::fetch(topic, format!("failed to create consumer: {e}")))?;

        let messages = consumer
            .messages()
            .await
            .map_err(|e| BusError::fetch(topic, format!("failed to open message stream: {e}")))?;

        info!(topic, group, "Subscribed to topic");
        Ok(Self {
            topic: topic.to_string(),
            key_prefix: kind.key_prefix(),
            messages,
        })
    }
}

#[async_trait]
impl TopicReader for NatsTopicReader {
    type Message = NatsMessage;

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn fetch(&mut self) -> Result<NatsMessage, BusError> {
        match self.messages.next().await {
            Some(Ok(msg)) => Ok(NatsMessage::new(msg, &self.topic, self.key_prefix)),
            Some(Err(e)) => Err(BusError::fetch(&self.topic, e.to_string())),
            None => Err(BusError::closed(&self.topic)),
        }
    }

    async fn commit(&mut self, msg: &NatsMessage) -> Result<(), BusError> {
        msg.inner
            .double_ack()
            .await
            .map_err(|e| BusError::commit(&self.topic, e.to_string()))
    }
}
