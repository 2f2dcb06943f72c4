//! HTTP transport for the chat-completions endpoint
//!
//! The transport performs exactly one POST and reports the raw status and
//! body. Deciding what a status means, and whether to try again, is the
//! client's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::wire::ChatCompletionRequest;

/// Raw HTTP outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response (DNS, TLS, timeout, ...)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
    endpoint: String,
    referer: String,
    title: String,
}

impl ReqwestTransport {
    pub fn new(
        base_url: &str,
        referer: impl Into<String>,
        title: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            referer: referer.into(),
            title: title.into(),
        })
    }
}

#[async_trait]
impl ChatTransport for ReqwestTransport {
    async fn post_chat(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let transport = ReqwestTransport::new(
            "https://openrouter.ai/api/v1/",
            "https://narrative-canvas.local",
            "Narrative Canvas Platform",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            transport.endpoint,
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_success_range() {
        assert!(TransportResponse { status: 200, body: String::new() }.is_success());
        assert!(!TransportResponse { status: 429, body: String::new() }.is_success());
        assert!(!TransportResponse { status: 302, body: String::new() }.is_success());
    }
}
