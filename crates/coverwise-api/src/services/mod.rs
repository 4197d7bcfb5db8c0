//! Service layer for policy extraction and comparison.

pub mod comparison;
pub mod extraction;

pub use comparison::ComparisonService;
pub use extraction::{ExtractionService, UploadedDocument};

use coverwise_core::{Error, Result};

/// Run synchronous reference-data I/O off the async runtime.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::Internal(format!("Reference loading task failed: {}", e)))
}
