//! Structured generation flows.
//!
//! A flow turns a typed, validated input into a schema-validated output by
//! rendering a natural-language prompt, making exactly one model-provider
//! call, and parsing/validating the JSON reply. Declaring the shape
//! ([`GenerationFlow::response_schema`]) separately from the prose
//! ([`GenerationFlow::render_prompt`]) lets one driver serve every
//! content-generation use case without bespoke parsing per flow.

pub mod error;
pub mod flow;
pub mod flows;

pub use error::{FlowError, FlowResult};
pub use flow::GenerationFlow;
pub use flows::*;
