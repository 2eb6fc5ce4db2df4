//! Local transport cache teardown

use std::future::Future;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Run `op`, retrying while it fails with `ResourceBusy`.
///
/// Gives up after `max_retries` retries and returns the last error; any
/// other error is returned immediately.
pub async fn retry_when_busy<F, Fut>(mut op: F, max_retries: u32, delay: Duration) -> io::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    let mut retries = 0;
    loop {
        match op().await {
            Err(e) if e.kind() == io::ErrorKind::ResourceBusy && retries < max_retries => {
                retries += 1;
                tracing::warn!(retries, max_retries, "Resource busy, retrying");
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

/// Delete a directory tree; a missing directory counts as removed
pub async fn remove_cache_dir(path: &Path, max_retries: u32, delay: Duration) -> io::Result<()> {
    retry_when_busy(
        || async move {
            match tokio::fs::remove_dir_all(path).await {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        },
        max_retries,
        delay,
    )
    .await
}
