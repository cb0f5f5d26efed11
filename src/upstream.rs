use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::warn;

use crate::error::UpstreamError;

/// Shared outbound client; all upstream calls go through one connection pool.
pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Turns a non-success response into an [`UpstreamError`], passing successes through.
pub async fn ensure_success(service: &'static str, response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(service, %status, body = %body, "upstream returned error status");
    Err(UpstreamError::from_status(status, body))
}

pub async fn json_body(service: &'static str, response: Response) -> Result<Value, UpstreamError> {
    let response = ensure_success(service, response).await?;
    response
        .json::<Value>()
        .await
        .map_err(|e| UpstreamError::Decode(format!("{service}: {e}")))
}

pub async fn bytes_body(service: &'static str, response: Response) -> Result<Bytes, UpstreamError> {
    let response = ensure_success(service, response).await?;
    Ok(response.bytes().await?)
}

/// Joins a base URL and a path without doubling the slash.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
