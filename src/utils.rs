use std::{
    env,
    path::{Path, PathBuf},
};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::error::StartupError;

async fn download_file(url: &str, path: &Path) -> Result<(), StartupError> {
    tracing::info!(%url, path = %path.display(), "downloading model");

    let mut header_map = HeaderMap::new();

    if let Ok(token) = env::var("GITHUB_TOKEN") {
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| StartupError::InvalidToken)?;
        header_map.insert(AUTHORIZATION, auth_value);
    }
    header_map.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));

    let download_err = |source| StartupError::Download {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .headers(header_map)
        .send()
        .await
        .map_err(download_err)?;

    if !response.status().is_success() {
        return Err(StartupError::DownloadStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(download_err)?;
    persist(path, &bytes).await
}

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".tmp");
    PathBuf::from(partial)
}

/// Writes to a sibling `.tmp` file, then renames it onto `path`.
async fn persist(path: &Path, bytes: &[u8]) -> Result<(), StartupError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let partial = partial_path(path);
    if let Err(err) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(err.into());
    }
    tokio::fs::rename(&partial, path).await?;
    Ok(())
}

/// Fetches the frozen graph from `model_url` when it is not on disk yet.
pub async fn ensure_model_exists(
    model_path: &str,
    model_url: Option<&str>,
) -> Result<(), StartupError> {
    let path = Path::new(model_path);
    if path.exists() {
        tracing::debug!(path = %path.display(), "model present");
        return Ok(());
    }

    match model_url {
        Some(url) => download_file(url, path).await,
        None => Err(StartupError::ModelMissing(model_path.to_string())),
    }
}

pub async fn ensure_upload_dir(upload_folder: &str) -> Result<(), StartupError> {
    tokio::fs::create_dir_all(upload_folder).await?;
    Ok(())
}
