use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::clock::Clock;
use crate::domain::ports::notify::{Notification, NotificationSink, NotifyError};

/// Publishes each notification as JSON on `<subject_prefix>.<user_id>`.
pub struct NatsNotificationSink {
    client: async_nats::Client,
    subject_prefix: String,
    clock: Arc<dyn Clock>,
}

impl NatsNotificationSink {
    pub fn new(client: async_nats::Client, subject_prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            subject_prefix: subject_prefix.into(),
            clock,
        }
    }

    fn subject_for(&self, user_id: &str) -> String {
        format!("{}.{}", self.subject_prefix, subject_token(user_id))
    }
}

/// Subject tokens may not contain separators, wildcards or whitespace.
fn subject_token(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '.' | '*' | '>' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[async_trait]
impl NotificationSink for NatsNotificationSink {
    async fn push(&self, user_id: &str, message: &str) -> Result<(), NotifyError> {
        let note = Notification::new(user_id, message, self.clock.now());
        let body = serde_json::to_vec(&note).map_err(|e| NotifyError::delivery(e.to_string()))?;
        let subject = self.subject_for(user_id);
        self.client
            .publish(subject.clone(), body.into())
            .await
            .map_err(|e| NotifyError::delivery(e.to_string()))?;
        debug!(subject = %subject, notification_id = %note.id, "Notification published");
        Ok(())
    }
}
