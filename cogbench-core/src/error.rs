use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors, surfaced before any request is made.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Provider tag is not in the closed provider set
    #[error("Unknown provider '{0}'. Use openai, azure-openai, gemini, or ollama")]
    UnknownProvider(String),

    /// A provider was selected without the credentials it needs
    #[error("Provider '{provider}' requires {what}")]
    MissingCredential {
        provider: &'static str,
        what: &'static str,
    },

    /// Prompt template file does not exist
    #[error("Prompt template not found: {0}")]
    TemplateNotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from provider generation calls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Transport-level failure (connection, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider API
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Request exceeded the configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Provider signalled rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Response contained no text content
    #[error("No content in response")]
    NoContent,

    /// Request was rejected before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other provider error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Transport errors, timeouts, rate limits, and 5xx responses are
    /// transient; everything else surfaces immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(_) => true,
            ProviderError::Timeout(_) => true,
            ProviderError::RateLimit(_) => true,
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::NoContent => false,
            ProviderError::InvalidRequest(_) => false,
            ProviderError::Other(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::timeout(ProviderError::Timeout(5000), true)]
    #[case::rate_limit(ProviderError::RateLimit("quota".into()), true)]
    #[case::server_error(ProviderError::Api { status: 503, message: "overloaded".into() }, true)]
    #[case::too_many_requests(ProviderError::Api { status: 429, message: "slow down".into() }, true)]
    #[case::auth(ProviderError::Api { status: 401, message: "bad key".into() }, false)]
    #[case::bad_request(ProviderError::Api { status: 400, message: "bad body".into() }, false)]
    #[case::no_content(ProviderError::NoContent, false)]
    #[case::invalid(ProviderError::InvalidRequest("empty prompt".into()), false)]
    fn test_is_retryable(#[case] error: ProviderError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownProvider("claude".into());
        assert!(err.to_string().contains("claude"));
        assert!(err.to_string().contains("openai"));

        let err = ConfigError::MissingCredential {
            provider: "gemini",
            what: "an API key",
        };
        assert!(err.to_string().contains("gemini"));
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Api {
            status: 500,
            message: "internal".into(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("internal"));
    }
}
