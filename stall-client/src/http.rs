//! HTTP client for network-based API calls
//!
//! Every call goes through [`fetch_with_retry_mode`] and unwraps the
//! `{success, code, message, data}` envelope. Reads retry on any transient
//! failure; writes retry only when the request never left the client,
//! unless they carry an idempotency key ([`HttpClient::post_idempotent`]).

use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;
use tokio_util::sync::CancellationToken;

use crate::retry::{RetryMode, RetryPolicy, fetch_with_retry_mode};
use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making network requests to the stall server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
    /// Cancels every in-flight call made through this client
    cancel: CancellationToken,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        // Per-attempt timeouts are enforced by the retry loop
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            policy: config.retry_policy(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Token cancelling all calls of this client (and its clones)
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::GET, path, None::<&()>, RetryMode::Transient)
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(Method::POST, path, Some(body), RetryMode::Unsent)
            .await
    }

    /// POST whose body carries an idempotency key the server deduplicates on
    pub async fn post_idempotent<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::POST, path, Some(body), RetryMode::Transient)
            .await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::POST, path, None::<&()>, RetryMode::Unsent)
            .await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(Method::PATCH, path, Some(body), RetryMode::Unsent)
            .await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::DELETE, path, None::<&()>, RetryMode::Transient)
            .await
    }

    /// POST whose success envelope carries no `data`
    pub async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.send(Method::POST, path, Some(body), RetryMode::Unsent)
            .await
            .map(|_: Option<serde_json::Value>| ())
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mode: RetryMode,
    ) -> ClientResult<T> {
        self.send(method, path, body, mode)
            .await?
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing data for {}", path)))
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mode: RetryMode,
    ) -> ClientResult<Option<T>> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        // Serialized once, replayed on every attempt
        let body = body.map(serde_json::to_vec).transpose()?;

        fetch_with_retry_mode(&self.policy, mode, &self.cancel, |attempt| {
            tracing::debug!(%method, url = %url, attempt, "Sending request");
            let mut request = self.client.request(method.clone(), url.as_str());
            if let Some(bytes) = &body {
                request = request
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }
            async move {
                let response = request.send().await?;
                Self::handle_response(response).await
            }
        })
        .await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<Option<T>> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let envelope = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes).ok();
            return Err(ClientError::Http {
                status: status.as_u16(),
                code: envelope.as_ref().map(|e| e.code),
                message: envelope
                    .map(|e| e.message)
                    .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned()),
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        if !envelope.success {
            return Err(ClientError::Http {
                status: status.as_u16(),
                code: Some(envelope.code),
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }
}

/// Percent-encode one path segment (`/`, `?`, `#` included)
pub fn path_segment(raw: &str) -> ClientResult<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ClientError::Validation(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Validation("URL cannot carry path segments".into()))?
        .pop_if_empty()
        .push(raw);
    Ok(url.path().trim_start_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_escapes_reserved_characters() {
        assert_eq!(path_segment("A001").unwrap(), "A001");
        assert_eq!(path_segment("a/b?c#d").unwrap(), "a%2Fb%3Fc%23d");
        assert_eq!(path_segment("受付 1").unwrap(), "%E5%8F%97%E4%BB%98%201");
    }
}
