//! Best-effort compensation helpers.
//!
//! Cleanup runs after the primary outcome of an operation is already
//! decided, so failures here are logged and swallowed, and each call is
//! bounded so an already-canceled caller cannot hang on its own rollback.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use storydeck_core::error::CoreError;
use storydeck_storage::ObjectStore;

/// Upper bound for a single compensating cleanup call.
pub(crate) const CLEANUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a multi-step write on its own task.
///
/// Axum drops the handler future when a client disconnects; a write that
/// has already touched the blob store must still reach its compensation
/// steps, so the sequence is detached from the request future and awaited
/// through a join handle instead.
pub(crate) async fn run_to_completion<T, F>(fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(result) => result,
        Err(err) => Err(CoreError::internal("detached write task failed", err)),
    }
}

/// Delete a blob as a compensating action. Never fails the caller.
pub(crate) async fn delete_blob_best_effort(
    blobs: &Arc<dyn ObjectStore>,
    url: &str,
    context: &'static str,
) {
    if url.is_empty() {
        return;
    }
    match tokio::time::timeout(CLEANUP_TIMEOUT, blobs.delete(url)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::warn!(%url, context, error = %err, "Blob cleanup failed");
        }
        Err(_) => {
            tracing::warn!(%url, context, "Blob cleanup timed out");
        }
    }
}
