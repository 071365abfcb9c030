pub mod memory;
pub mod nats;

pub use memory::{MemoryPublisher, MemoryTopicReader};
pub use nats::NatsTopicReader;
