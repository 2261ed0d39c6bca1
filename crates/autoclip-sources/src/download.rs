//! Request helpers shared by the collaborators.

use std::path::Path;

use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::error::{ensure_success, SourceError, SourceResult};

/// Join `path` onto `base`, keeping any path prefix the base carries.
pub(crate) fn endpoint(base: &str, path: &str) -> SourceResult<Url> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

/// GET `url` and stream the body into `dest`.
pub(crate) async fn download_to_file(
    client: &Client,
    service: &'static str,
    url: &str,
    dest: &Path,
    max_bytes: u64,
) -> SourceResult<u64> {
    let response = client.get(url).send().await?;
    write_body(service, response, dest, max_bytes).await
}

/// Stream a response body into `dest`.
///
/// Non-2xx responses, bodies larger than `max_bytes` (by `Content-Length`
/// or by bytes actually received) and empty bodies are errors; a partially
/// written file is removed.
pub(crate) async fn write_body(
    service: &'static str,
    response: Response,
    dest: &Path,
    max_bytes: u64,
) -> SourceResult<u64> {
    let mut response = ensure_success(service, response).await?;
    let url = response.url().to_string();

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(SourceError::PayloadTooLarge {
                url,
                limit: max_bytes,
            });
        }
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let result = async {
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(SourceError::PayloadTooLarge {
                    url: url.clone(),
                    limit: max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        if written == 0 {
            return Err(SourceError::empty(service, format!("empty body from {}", url)));
        }
        Ok::<_, SourceError>(written)
    }
    .await;

    match result {
        Ok(bytes) => {
            debug!(service, bytes, dest = %dest.display(), "Saved download");
            Ok(bytes)
        }
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            Err(e)
        }
    }
}
