pub mod dto;
pub mod error;
pub mod handlers;
pub mod request_id;
pub mod routes;

pub use routes::{router, RestState};
