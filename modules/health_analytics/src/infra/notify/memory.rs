use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::ports::notify::{Notification, NotificationSink, NotifyError};

/// Keeps every notification in memory and logs it. Used by `--mock` runs and tests.
pub struct InMemoryNotificationSink {
    delivered: Mutex<Vec<Notification>>,
    failing: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl InMemoryNotificationSink {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            clock,
        }
    }

    /// While failing, every push is rejected and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn push(&self, user_id: &str, message: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::delivery("notification sink rejected the message"));
        }
        let note = Notification::new(user_id, message, self.clock.now());
        info!(user_id = %note.user_id, message = %note.message, "Notification");
        self.delivered.lock().push(note);
        Ok(())
    }
}
