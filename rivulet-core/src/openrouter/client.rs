//! OpenRouter HTTP client
//!
//! One pooled client serves both the streamed chat-completions call and
//! the read-only model discovery endpoint. The per-request timeout is
//! applied to discovery calls only; a streamed completion may legitimately
//! stay open far longer than any fixed budget, so it relies on the connect
//! timeout plus cooperative cancellation.

use crate::config::SecretString;
use crate::openrouter::error::{map_status_error, ClientError, ClientResult};
use crate::openrouter::types::{ChatCompletionRequest, ModelInfo, ModelList};
use crate::stream::controller::{ChatTransport, RecordStream};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Hosted OpenRouter API root
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const MODELS_PATH: &str = "/models";

const USER_AGENT: &str = concat!("rivulet/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`OpenRouterClient`]
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API root; an OpenRouter-compatible server may be substituted
    pub base_url: String,

    /// Bearer credential; may be empty until the user supplies one
    pub api_key: SecretString,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Total timeout in seconds for non-streaming calls
    pub request_timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::new(""),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl OpenRouterConfig {
    /// Config for the hosted endpoint with the given credential
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// Shared HTTP client with connection pooling
pub struct OpenRouterClient {
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterClient {
    /// Create a new client, validating the configured base URL
    pub fn new(config: OpenRouterConfig) -> ClientResult<Self> {
        Url::parse(&config.base_url).map_err(|err| {
            ClientError::Configuration(format!(
                "invalid base URL '{}': {err}",
                config.base_url
            ))
        })?;

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|err| {
                ClientError::Configuration(format!("failed to create HTTP client: {err}"))
            })?;

        Ok(Self { config, client })
    }

    /// The credential, or the precondition failure before any network call
    fn require_api_key(&self) -> ClientResult<&str> {
        if self.config.api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        Ok(self.config.api_key.expose_secret())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Fetch the model catalogue from the discovery endpoint
    pub async fn models(&self) -> ClientResult<Vec<ModelInfo>> {
        let api_key = self.require_api_key()?;
        let url = self.endpoint(MODELS_PATH);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .send()
            .await
            .map_err(ClientError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            warn!("model discovery failed with status {}", status);
            return Err(map_status_error(status, body));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|err| ClientError::InvalidResponse(format!("invalid model list: {err}")))?;
        Ok(list.data)
    }

    /// Verify the credential and that `model` exists in the catalogue
    ///
    /// Any failure maps to [`ClientError::Validation`] with a message
    /// guiding the user to check the credential, except the empty-key
    /// precondition which keeps its own variant.
    pub async fn validate_credentials(&self, model: &str) -> ClientResult<()> {
        let models = self.models().await.map_err(|err| match err {
            ClientError::MissingApiKey => ClientError::MissingApiKey,
            other => ClientError::Validation(format!(
                "could not verify the API key: {other}; check that the key is correct"
            )),
        })?;

        if models.iter().any(|entry| entry.id == model) {
            Ok(())
        } else {
            Err(ClientError::Validation(format!(
                "the API key is valid but model '{model}' is not available"
            )))
        }
    }

    /// Boolean convenience form of [`validate_credentials`](Self::validate_credentials)
    pub async fn check_api_key(&self, model: &str) -> bool {
        self.validate_credentials(model).await.is_ok()
    }

    /// Ids of models whose prompt and completion pricing are both zero
    ///
    /// Discovery failures yield an empty list rather than an error: the
    /// suggestion box just stays empty.
    pub async fn free_models(&self) -> Vec<String> {
        match self.models().await {
            Ok(models) => models
                .into_iter()
                .filter(ModelInfo::is_free)
                .map(|model| model.id)
                .collect(),
            Err(err) => {
                warn!("free-model discovery failed: {}", err);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ChatTransport for OpenRouterClient {
    async fn open_chat_stream(&self, request: &ChatCompletionRequest) -> ClientResult<RecordStream> {
        let api_key = self.require_api_key()?;
        let url = self.endpoint(CHAT_COMPLETIONS_PATH);
        info!("POST {} (model '{}')", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            warn!("chat request failed with status {}", status);
            return Err(map_status_error(status, body));
        }

        Ok(Box::pin(response.bytes_stream().map_err(|err| {
            ClientError::Network(format!("stream read failed: {err}"))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = OpenRouterConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OpenRouterClient::new(config),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_config_targets_openrouter() {
        let config = OpenRouterConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_empty());
    }
}
