//! Agent binary download.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpTransport};

/// Downloads `url` into `dest` and marks it executable for owner, group
/// and other. Returns the number of bytes written.
pub async fn download_to_file(
    http: &dyn HttpTransport,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<u64, TransportError> {
    let resp = http.send(HttpRequest::get(url).with_timeout(timeout)).await?;
    if !resp.is_ok() {
        return Err(TransportError::Connect(format!(
            "download of {url} returned status {}",
            resp.status
        )));
    }
    tokio::fs::write(dest, &resp.body)
        .await
        .map_err(|e| TransportError::Connect(format!("failed to write {}: {e}", dest.display())))?;
    mark_executable(dest).await?;
    info!(url, path = %dest.display(), bytes = resp.body.len(), "binary downloaded");
    Ok(resp.body.len() as u64)
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<(), TransportError> {
    use std::os::unix::fs::PermissionsExt;

    let chmod_err =
        |e: std::io::Error| TransportError::Connect(format!("chmod {}: {e}", path.display()));
    let mut perms = tokio::fs::metadata(path).await.map_err(chmod_err)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    tokio::fs::set_permissions(path, perms)
        .await
        .map_err(chmod_err)
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<(), TransportError> {
    Ok(())
}
