use serde::Serialize;

/// One generation request, built per flow invocation and never mutated.
/// `response_schema` is the JSON-schema rendering of the flow's declared
/// output shape; the provider is asked to constrain its reply to it.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Name under which the schema is registered with the provider
    pub schema_name: String,
    pub prompt: String,
    pub system: Option<String>,
    pub response_schema: serde_json::Value,
}

impl GenerationRequest {
    pub fn new(
        schema_name: impl Into<String>,
        prompt: impl Into<String>,
        response_schema: serde_json::Value,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            prompt: prompt.into(),
            system: None,
            response_schema,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}
