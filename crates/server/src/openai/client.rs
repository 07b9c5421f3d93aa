//! `OpenAI` API client for description cleanup.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::OpenAiConfig;
use crate::ports::TextNormalizer;

use super::error::{ApiErrorResponse, NormalizerError};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// `OpenAI` chat completions client.
#[derive(Clone)]
pub struct OpenAiNormalizer {
    inner: Arc<OpenAiNormalizerInner>,
}

struct OpenAiNormalizerInner {
    client: reqwest::Client,
    model: String,
}

impl OpenAiNormalizer {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `NormalizerError::Config` if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self, NormalizerError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
                .map_err(|_| NormalizerError::Config("API key is not a valid header".into()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| NormalizerError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(OpenAiNormalizerInner {
                client,
                model: config.model.clone(),
            }),
        })
    }

    /// Run `text` through the model with `instruction` as the system prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with an error,
    /// or the completion is empty.
    #[instrument(skip(self, instruction, text), fields(model = %self.inner.model, len = text.len()))]
    pub async fn complete(&self, instruction: &str, text: &str) -> Result<String, NormalizerError> {
        let request = ChatCompletionRequest {
            model: self.inner.model.clone(),
            messages: vec![ChatMessage::system(instruction), ChatMessage::user(text)],
            temperature: 0.0,
        };

        let response = self
            .inner
            .client
            .post(OPENAI_API_URL)
            .json(&request)
            .send()
            .await?;

        let completion = Self::handle_response(response).await?;
        completion
            .first_text()
            .ok_or(NormalizerError::EmptyCompletion)
    }

    /// Parse a successful response or turn an error status into an error.
    async fn handle_response(
        response: reqwest::Response,
    ) -> Result<ChatCompletionResponse, NormalizerError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| NormalizerError::Parse(format!("Failed to parse response: {e}")));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(20);
            return Err(NormalizerError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(NormalizerError::Unauthorized("Invalid API key".to_string()));
        }

        let body = response.text().await?;
        Err(match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) => NormalizerError::Api {
                error_type: api_error.error.error_type,
                message: api_error.error.message,
            },
            Err(_) => NormalizerError::Api {
                error_type: format!("http_{}", status.as_u16()),
                message: body.chars().take(200).collect(),
            },
        })
    }
}

#[async_trait]
impl TextNormalizer for OpenAiNormalizer {
    async fn normalize(&self, instruction: &str, text: &str) -> Result<String, NormalizerError> {
        self.complete(instruction, text).await
    }
}
