//! Topic consumers: fetch → route → decode → apply → notify → commit.

pub mod pipeline;
pub mod routing;

pub use pipeline::{IngestPipeline, Outcome};
pub use routing::{route, Operation};
