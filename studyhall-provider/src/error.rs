use thiserror::Error;

/// Failures of the outbound model call itself. Schema conformance of the
/// returned value is the caller's concern, not the provider's.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network or connection error
    #[error("network error: {0}")]
    Network(reqwest::Error),

    /// Request timed out at the transport layer
    #[error("provider request timed out")]
    Timeout,

    /// Provider returned a non-2xx response
    #[error("provider API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider returned a 2xx response with no usable content
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// Provider content was not parseable as JSON
    #[error("provider returned malformed JSON: {0}")]
    MalformedJson(String),

    /// Client-side configuration error
    #[error("provider configuration error: {0}")]
    Configuration(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Network(err)
        }
    }
}
