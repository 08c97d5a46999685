pub mod bid;
pub mod health;
pub mod job;

use crate::error::AppError;
use types::errors::AuctionError;

/// Run an engine call on the blocking pool; store writes fsync.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AuctionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("blocking task failed: {e}")))?
        .map_err(AppError::from)
}
