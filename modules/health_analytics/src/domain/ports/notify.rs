use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A user-facing notice as delivered to the notification store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub created: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            message: message.into(),
            created,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification queue is full")]
    QueueFull,

    #[error("notification queue is closed")]
    Closed,

    #[error("notification delivery failed: {message}")]
    Delivery { message: String },
}

impl NotifyError {
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Port for best-effort user notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn push(&self, user_id: &str, message: &str) -> Result<(), NotifyError>;
}
