//! Intercom API client: create admin-initiated messages and reply to conversations.
//!
//! [`IntercomApi`] is the seam the channel dispatches through; [`HttpIntercomClient`] is the
//! reqwest implementation against `https://api.intercom.io`.

use crate::config::{self, Config};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use std::fmt;

const INTERCOM_API_BASE: &str = "https://api.intercom.io";
const DEFAULT_API_VERSION: &str = "2.11";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Intercom answered with a non-success status.
    #[error("intercom api error: {message}")]
    BadResponse { status: u16, message: String },
    #[error("intercom request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("intercom access token not configured")]
    MissingToken,
    #[error("invalid intercom base url: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid conversation id: {0:?}")]
    InvalidConversationId(String),
}

/// Outbound operations used by the channel.
#[async_trait]
pub trait IntercomApi: Send + Sync {
    /// POST /messages
    async fn create_message(&self, fields: &Value) -> Result<(), ApiError>;

    /// POST /conversations/{id}/reply
    async fn reply_to_conversation(&self, conversation_id: &str, body: &Value) -> Result<(), ApiError>;
}

/// Client for the Intercom REST API.
#[derive(Clone)]
pub struct HttpIntercomClient {
    base_url: String,
    token: Option<String>,
    api_version: String,
    client: reqwest::Client,
}

impl fmt::Debug for HttpIntercomClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpIntercomClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl HttpIntercomClient {
    pub fn new(token: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| INTERCOM_API_BASE.to_string());
        Self {
            base_url,
            token,
            api_version: DEFAULT_API_VERSION.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config: token (env INTERCOM_ACCESS_TOKEN overrides), base URL, API version and timeout.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let intercom = &config.intercom;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = intercom.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            ..Self::new(config::resolve_access_token(config), Some(intercom.base_url.clone()))
        }
        .with_api_version(intercom.api_version.clone()))
    }

    /// Value of the `Intercom-Version` header.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended; each segment is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json(&self, segments: &[&str], body: &Value) -> Result<(), ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        let url = self.endpoint(segments)?;
        log::debug!("intercom: POST {}", url);
        let res = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .header("Intercom-Version", &self.api_version)
            .json(body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = match res.text().await {
                Ok(body) => body,
                Err(e) => {
                    log::debug!("intercom: could not read {} response body: {}", status, e);
                    String::new()
                }
            };
            return Err(ApiError::BadResponse {
                status: status.as_u16(),
                message: format!("{} {}", status, body),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IntercomApi for HttpIntercomClient {
    async fn create_message(&self, fields: &Value) -> Result<(), ApiError> {
        self.post_json(&["messages"], fields).await
    }

    async fn reply_to_conversation(&self, conversation_id: &str, body: &Value) -> Result<(), ApiError> {
        // "." and ".." would be dropped from the path rather than encoded
        if matches!(conversation_id.trim(), "" | "." | "..") {
            return Err(ApiError::InvalidConversationId(conversation_id.to_string()));
        }
        self.post_json(&["conversations", conversation_id, "reply"], body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_defaults_and_trims() {
        assert_eq!(HttpIntercomClient::new(None, None).base_url(), INTERCOM_API_BASE);
        let c = HttpIntercomClient::new(None, Some("http://127.0.0.1:9000/".to_string()));
        assert_eq!(c.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn debug_hides_token() {
        let c = HttpIntercomClient::new(Some("secret-token".to_string()), None);
        let s = format!("{:?}", c);
        assert!(!s.contains("secret-token"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn from_config_uses_config_values() {
        let mut config = Config::default();
        config.intercom.base_url = "http://localhost:1234/".to_string();
        config.intercom.api_version = "2.10".to_string();
        let c = HttpIntercomClient::from_config(&config).unwrap();
        assert_eq!(c.base_url(), "http://localhost:1234");
        assert_eq!(c.api_version, "2.10");
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let c = HttpIntercomClient::new(None, Some("http://127.0.0.1:9000/api/".to_string()));
        let url = c
            .endpoint(&["conversations", "1/../../messages#?x", "reply"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/api/conversations/1%2F..%2F..%2Fmessages%23%3Fx/reply"
        );
        let url = HttpIntercomClient::new(None, None).endpoint(&["messages"]).unwrap();
        assert_eq!(url.as_str(), "https://api.intercom.io/messages");
    }

    #[test]
    fn bad_base_url_is_an_error() {
        let c = HttpIntercomClient::new(None, Some("not a url".to_string()));
        assert!(matches!(c.endpoint(&["messages"]), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn dot_segments_are_rejected_as_conversation_ids() {
        let c = HttpIntercomClient::new(
            Some("tok".to_string()),
            Some("http://127.0.0.1:9".to_string()),
        );
        for id in [".", "..", " "] {
            let err = c
                .reply_to_conversation(id, &serde_json::json!({}))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidConversationId(_)), "id {:?}", id);
        }
    }

    #[test]
    fn zero_timeout_still_builds_a_client() {
        let mut config = Config::default();
        config.intercom.timeout_secs = 0;
        assert!(HttpIntercomClient::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn missing_token_fails_before_request() {
        // Nothing listens on port 9; a request attempt would surface as ApiError::Http.
        let c = HttpIntercomClient::new(None, Some("http://127.0.0.1:9".to_string()));
        let err = c.create_message(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }
}
