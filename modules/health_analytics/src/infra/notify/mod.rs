pub mod dispatcher;
pub mod memory;
pub mod nats;

pub use dispatcher::NotificationDispatcher;
pub use memory::InMemoryNotificationSink;
pub use nats::NatsNotificationSink;
