use async_trait::async_trait;
use studyhall_provider::{GenerationRequest, ModelProvider, ProviderError, ProviderResult};

enum StubBehavior {
    Reply(serde_json::Value),
    Fail,
}

/// Canned model provider for handler tests.
pub struct StubProvider {
    behavior: StubBehavior,
}

impl StubProvider {
    pub fn replying(value: serde_json::Value) -> Self {
        Self {
            behavior: StubBehavior::Reply(value),
        }
    }

    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            behavior: StubBehavior::Fail,
        }
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn generate(&self, _request: &GenerationRequest) -> ProviderResult<serde_json::Value> {
        match &self.behavior {
            StubBehavior::Reply(value) => Ok(value.clone()),
            StubBehavior::Fail => Err(ProviderError::Api {
                status: 500,
                message: "stub failure".to_string(),
            }),
        }
    }
}
