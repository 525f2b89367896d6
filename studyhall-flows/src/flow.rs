use async_trait::async_trait;
use serde::de::DeserializeOwned;
use studyhall_core::SchemaViolation;
use studyhall_provider::{GenerationRequest, ModelProvider};
use tracing::debug;
use validator::Validate;

use crate::error::{FlowError, FlowResult};

/// A named, schema-in/schema-out unit of work.
///
/// Implementations declare their typed input and output, render the prompt
/// and the JSON schema handed to the provider, and validate the parsed
/// reply. The provided [`execute`](GenerationFlow::execute) driver ties
/// those pieces together and is the only place a provider call happens:
/// one outbound call per invocation, no retries.
#[async_trait]
pub trait GenerationFlow: Send + Sync {
    type Input: Validate + Send + Sync;
    type Output: DeserializeOwned + Send;

    /// Stable flow name; doubles as the schema name on the wire.
    fn name(&self) -> &'static str;

    fn system_prompt(&self) -> Option<&'static str> {
        None
    }

    /// Pure string building over the immutable input: fixed instructions,
    /// conditional sections for optional fields, list fields joined as
    /// delimited text.
    fn render_prompt(&self, input: &Self::Input) -> String;

    /// JSON-schema rendering of `Self::Output`, submitted alongside the
    /// prompt to constrain the provider's reply.
    fn response_schema(&self) -> serde_json::Value;

    /// Bounds and cardinality checks that the type system alone cannot
    /// express (numeric ranges, exactly-one-correct, element counts).
    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation>;

    /// Validate input, render, call the provider once, parse, validate
    /// output. Returns a fully shaped `Self::Output` or a [`FlowError`];
    /// never a partial result.
    async fn execute(
        &self,
        provider: &dyn ModelProvider,
        input: Self::Input,
    ) -> FlowResult<Self::Output> {
        input
            .validate()
            .map_err(|e| FlowError::InvalidInput(SchemaViolation::from(e)))?;

        let prompt = self.render_prompt(&input);
        let mut request = GenerationRequest::new(self.name(), prompt, self.response_schema());
        if let Some(system) = self.system_prompt() {
            request = request.with_system(system);
        }

        debug!(flow = self.name(), "invoking model provider");
        let value = provider.generate(&request).await?;

        let output: Self::Output = serde_json::from_value(value)
            .map_err(|e| FlowError::MalformedResponse(e.to_string()))?;

        self.validate_output(&output, &input)
            .map_err(FlowError::InvalidOutput)?;

        Ok(output)
    }
}

/// Shared field check used by the flow validators.
pub(crate) fn non_empty(field: &str, value: &str) -> Result<(), SchemaViolation> {
    if value.trim().is_empty() {
        Err(SchemaViolation::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}
