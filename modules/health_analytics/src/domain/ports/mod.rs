pub mod bus;
pub mod notify;

pub use bus::{BusError, InboundMessage, TopicReader};
pub use notify::{Notification, NotificationSink, NotifyError};
