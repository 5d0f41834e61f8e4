//! Best-effort execution
//!
//! Optional fetches and cleanup steps must not abort an operation. Routing
//! them through [`attempt`] keeps the "ignore failure" intent visible at the
//! call site and still leaves a trace in the logs.

use crate::error::Result;
use std::future::Future;
use tracing::warn;

/// Run `fut`, log and discard any error
pub async fn attempt<T, F>(label: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "{label} failed (ignored)");
            None
        }
    }
}

/// Synchronous counterpart of [`attempt`]
pub fn attempt_sync<T, E: std::fmt::Display>(
    label: &str,
    result: std::result::Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "{label} failed (ignored)");
            None
        }
    }
}
