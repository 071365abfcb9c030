// === PUBLIC CONTRACT ===
// Other crates talk to this module through the contract only
pub mod contract;

pub use contract::{client, error, model};

// === MODULE DEFINITION ===
pub mod config;
pub mod module;
pub use module::HealthAnalytics;

// === INTERNAL MODULES ===
// Exposed for integration tests and the server binary; not a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
#[doc(hidden)]
pub mod ingest;
