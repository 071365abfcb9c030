use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::ports::notify::{NotificationSink, NotifyError};

struct Pending {
    user_id: String,
    message: String,
}

/// Bounded fire-and-forget queue in front of a slower sink.
///
/// `push` only enqueues, so consumers never wait on delivery. A background task
/// drains the queue into the wrapped sink and logs delivery failures.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Pending>,
}

impl NotificationDispatcher {
    /// Start the delivery task. It stops when `cancel` fires, after flushing what is queued.
    pub fn spawn(
        sink: Arc<dyn NotificationSink>,
        capacity: usize,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(deliver(sink, rx, cancel));
        (Self { tx }, handle)
    }
}

async fn deliver(
    sink: Arc<dyn NotificationSink>,
    mut rx: mpsc::Receiver<Pending>,
    cancel: CancellationToken,
) {
    info!("Notification dispatcher started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(p) => send_one(sink.as_ref(), p).await,
                None => break,
            },
        }
    }

    rx.close();
    while let Ok(p) = rx.try_recv() {
        send_one(sink.as_ref(), p).await;
    }
    info!("Notification dispatcher stopped");
}

async fn send_one(sink: &dyn NotificationSink, p: Pending) {
    match sink.push(&p.user_id, &p.message).await {
        Ok(()) => debug!(user_id = %p.user_id, "Notification delivered"),
        Err(e) => warn!(user_id = %p.user_id, error = %e, "Notification delivery failed"),
    }
}

#[async_trait]
impl NotificationSink for NotificationDispatcher {
    async fn push(&self, user_id: &str, message: &str) -> Result<(), NotifyError> {
        self.tx
            .try_send(Pending {
                user_id: user_id.to_string(),
                message: message.to_string(),
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => NotifyError::QueueFull,
                TrySendError::Closed(_) => NotifyError::Closed,
            })
    }
}
