use studyhall_core::SchemaViolation;
use studyhall_provider::ProviderError;
use thiserror::Error;

/// Flow-level failure taxonomy. Validation failures are never retried or
/// coerced here; the caller decides what a failed flow means.
#[derive(Error, Debug)]
pub enum FlowError {
    /// The input did not conform to the flow's input schema. Raised before
    /// any provider call is made.
    #[error("invalid flow input: {0}")]
    InvalidInput(SchemaViolation),

    /// The outbound model call itself failed.
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    /// The provider replied, but the reply did not parse into the declared
    /// output type.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// The reply parsed, but violated a declared bound or cardinality.
    #[error("invalid flow output: {0}")]
    InvalidOutput(SchemaViolation),
}

pub type FlowResult<T> = Result<T, FlowError>;
