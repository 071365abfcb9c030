pub mod mapper;
pub mod memory;
pub mod mongo;

pub use memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;
