//! Artifact and avatar retrieval.

use doorman_core::error::DoormanError;
use std::path::Path;
use tracing::debug;

/// Fetch a URL into memory (avatar images are small).
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, DoormanError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| DoormanError::DownloadFailed(format!("GET {url} failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(DoormanError::DownloadFailed(format!(
            "GET {url} returned {}",
            resp.status()
        )));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| DoormanError::DownloadFailed(format!("reading {url} failed: {e}")))?;
    Ok(bytes.to_vec())
}

/// Download a generated image to local storage.
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
) -> Result<(), DoormanError> {
    let bytes = fetch_bytes(client, url).await?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    debug!("downloaded {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
