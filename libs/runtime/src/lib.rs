//! Process-level plumbing shared by the server binary: layered configuration,
//! logging bootstrap, home directory resolution and shutdown signals.

pub mod config;
pub mod logging;
pub mod paths;
pub mod shutdown;

pub use config::{
    AppConfig, BusConfig, CliArgs, LoggingConfig, Section, ServerConfig, StoreConfig,
};
