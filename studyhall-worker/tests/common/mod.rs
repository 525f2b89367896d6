use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use studyhall_provider::{GenerationRequest, ModelProvider, ProviderError, ProviderResult};

enum StubBehavior {
    Reply(serde_json::Value),
    Fail,
}

/// Canned model provider counting the calls it receives.
pub struct StubProvider {
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn replying(value: serde_json::Value) -> Self {
        Self {
            behavior: StubBehavior::Reply(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: StubBehavior::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn generate(&self, _request: &GenerationRequest) -> ProviderResult<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            StubBehavior::Reply(value) => Ok(value.clone()),
            StubBehavior::Fail => Err(ProviderError::Api {
                status: 500,
                message: "stub failure".to_string(),
            }),
        }
    }
}
