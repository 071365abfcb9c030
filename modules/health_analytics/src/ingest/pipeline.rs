use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::contract::CallContext;
use crate::domain::entity::Entity;
use crate::domain::ports::bus::{BusError, InboundMessage, TopicReader};
use crate::domain::ports::notify::NotificationSink;
use crate::domain::repository::Repository;
use crate::ingest::routing::{route, Operation};

/// What happened to one consumed message. Every outcome is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created { id: String },
    Updated { id: String },
    UnknownKey,
    DecodeFailed,
    ApplyFailed,
}

/// Sequential consume loop for one record kind on one topic.
pub struct IngestPipeline<E: Entity, R: TopicReader> {
    reader: R,
    repo: Repository<E>,
    notifier: Arc<dyn NotificationSink>,
}

impl<E: Entity, R: TopicReader> IngestPipeline<E, R> {
    pub fn new(reader: R, repo: Repository<E>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            reader,
            repo,
            notifier,
        }
    }

    /// Consume until fetch or commit fails; that error is returned.
    pub async fn run(mut self) -> Result<(), BusError> {
        info!(topic = %self.reader.topic(), kind = %E::KIND, "Consumer started");
        loop {
            let msg = self.reader.fetch().await.inspect_err(|e| {
                error!(topic = %self.reader.topic(), error = %e, "Fetch failed, stopping consumer");
            })?;

            let outcome = self.handle(&msg).await;
            debug!(topic = %self.reader.topic(), key = %msg.key(), ?outcome, "Message handled");

            self.reader.commit(&msg).await.inspect_err(|e| {
                error!(topic = %self.reader.topic(), error = %e, "Commit failed, stopping consumer");
            })?;
        }
    }

    /// Route, decode, apply and notify for one message. Never fails: problems are
    /// logged and reported through the outcome so the message can still be committed.
    pub async fn handle(&self, msg: &R::Message) -> Outcome {
        let topic = self.reader.topic();
        let key = msg.key();

        let Some(op) = route(E::KIND, key) else {
            warn!(topic, key, "Unknown message key, skipping");
            return Outcome::UnknownKey;
        };

        let record: E = match serde_json::from_slice(msg.payload()) {
            Ok(r) => r,
            Err(e) => {
                error!(topic, key, error = %e, "Failed to decode message body, skipping");
                return Outcome::DecodeFailed;
            }
        };

        let user_id = record.user_id().to_string();
        let ctx = CallContext::background();
        let outcome = match op {
            Operation::Create => match self.repo.create(&ctx, record).await {
                Ok(id) => Outcome::Created { id },
                Err(e) => {
                    error!(topic, key, error = %e, "Failed to create {}", E::KIND);
                    Outcome::ApplyFailed
                }
            },
            Operation::Update => {
                let id = record.id().to_string();
                match self.repo.update(&ctx, record).await {
                    Ok(()) => Outcome::Updated { id },
                    Err(e) => {
                        error!(topic, key, error = %e, "Failed to update {}", E::KIND);
                        Outcome::ApplyFailed
                    }
                }
            }
        };

        // Sent regardless of the store result; delivery problems only get logged.
        if let Some(message) = op.notification(E::KIND) {
            if let Err(e) = self.notifier.push(&user_id, message).await {
                warn!(topic, key, user_id = %user_id, error = %e, "Failed to send notification");
            }
        }

        outcome
    }
}
