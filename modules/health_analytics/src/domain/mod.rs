pub mod clock;
pub mod document;
pub mod entity;
pub mod error;
pub mod ports;
pub mod repo;
pub mod repository;
pub mod summary;

use std::future::Future;

use crate::contract::CallContext;
use error::DomainError;

/// Await `fut` under `ctx`; cancellation and deadline both surface as `Cancelled`.
pub(crate) async fn within<F: Future>(ctx: &CallContext, fut: F) -> Result<F::Output, DomainError> {
    ctx.run(fut).await.map_err(|_| DomainError::cancelled())
}
