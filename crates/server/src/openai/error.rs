//! Error types for the `OpenAI` client.

use thiserror::Error;

/// Errors that can occur when normalizing text.
#[derive(Debug, Error)]
pub enum NormalizerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error object.
    #[error("API error ({error_type}): {message}")]
    Api {
        /// Error type from the API.
        error_type: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse the response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The completion contained no text.
    #[error("empty completion")]
    EmptyCompletion,

    /// Client could not be built from configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Error body returned by the API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub error_type: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizer_error_display() {
        let err = NormalizerError::RateLimited(20);
        assert_eq!(err.to_string(), "rate limited, retry after 20 seconds");

        let err = NormalizerError::Api {
            error_type: "invalid_request_error".to_string(),
            message: "model not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (invalid_request_error): model not found"
        );
    }

    #[test]
    fn test_api_error_deserialization() {
        let json = r#"{
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        }"#;

        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.error_type, "invalid_request_error");
        assert_eq!(response.error.message, "Incorrect API key provided");
    }
}
