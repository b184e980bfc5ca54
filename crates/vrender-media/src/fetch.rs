//! Remote asset fetching.
//!
//! Streams a remote asset into a destination file inside the request's
//! workspace. No retry here; retry policy belongs to the caller.

use futures_util::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Download one asset to `dest`.
///
/// Fails with [`MediaError::AssetUnreachable`] when the source cannot be
/// reached or answers with a non-success status, and with
/// [`MediaError::DownloadFailed`] when the transfer is truncated or empty.
pub async fn download_asset(
    client: &reqwest::Client,
    url: &str,
    dest: impl AsRef<Path>,
) -> MediaResult<()> {
    let dest = dest.as_ref();
    debug!("Fetching {} -> {}", url, dest.display());

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::unreachable(url, e.to_string()))?;

    let response = response
        .error_for_status()
        .map_err(|e| MediaError::unreachable(url, e.to_string()))?;

    let expected_len = response.content_length();

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MediaError::download_failed(url, e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| MediaError::download_failed(url, e.to_string()))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| MediaError::download_failed(url, e.to_string()))?;

    if written == 0 {
        return Err(MediaError::download_failed(url, "empty response body"));
    }

    if let Some(expected) = expected_len {
        if written != expected {
            return Err(MediaError::download_failed(
                url,
                format!("truncated transfer: got {} of {} bytes", written, expected),
            ));
        }
    }

    info!("Fetched {} ({} bytes) -> {}", url, written, dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_writes_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asset.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-video-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("asset.mp4");
        let client = reqwest::Client::new();

        download_asset(&client, &format!("{}/asset.mp4", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"fake-video-bytes");
    }

    #[tokio::test]
    async fn test_not_found_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let err = download_asset(
            &client,
            &format!("{}/missing.mp4", server.uri()),
            dir.path().join("missing.mp4"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::AssetUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_empty_body_is_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let err = download_asset(
            &client,
            &format!("{}/empty.mp4", server.uri()),
            dir.path().join("empty.mp4"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::DownloadFailed { .. }));
    }

    #[tokio::test]
    async fn test_dead_endpoint_is_unreachable() {
        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        // Nothing listens on this port.
        let err = download_asset(
            &client,
            "http://127.0.0.1:1/asset.mp4",
            dir.path().join("asset.mp4"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::AssetUnreachable { .. }));
    }
}
