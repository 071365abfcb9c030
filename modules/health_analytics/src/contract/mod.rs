pub mod client;
pub mod context;
pub mod error;
pub mod kind;
pub mod model;

pub use client::{EntityApi, HealthAnalyticsApi, SummaryApi};
pub use context::CallContext;
pub use error::HealthAnalyticsError;
pub use kind::{EntityKind, HealthRecord};
pub use model::*;
