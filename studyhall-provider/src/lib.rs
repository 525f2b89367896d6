//! Outbound client for the generative-model provider.
//!
//! The rest of the system talks to the provider through the
//! [`ModelProvider`] trait; [`HttpModelProvider`] is the production
//! implementation, speaking the OpenAI-compatible chat-completions
//! protocol with a JSON-schema constrained response format.

pub mod config;
pub mod error;
pub mod http;
pub mod request;

pub use config::ProviderConfig;
pub use error::{ProviderError, ProviderResult};
pub use http::HttpModelProvider;
pub use request::GenerationRequest;

use async_trait::async_trait;

/// A generative-model backend that turns a rendered prompt plus a declared
/// output schema into a JSON value. Exactly one outbound call per
/// `generate` invocation; retry policy, if any, belongs to the caller.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<serde_json::Value>;
}
