use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use studyhall_provider::{GenerationRequest, ModelProvider, ProviderError, ProviderResult};

enum StubBehavior {
    Reply(serde_json::Value),
    Fail,
}

/// Canned model provider that records every request it receives.
pub struct StubProvider {
    behavior: StubBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl StubProvider {
    pub fn replying(value: serde_json::Value) -> Self {
        Self {
            behavior: StubBehavior::Reply(value),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: StubBehavior::Fail,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.last_request()
            .map(|r| r.prompt)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.behavior {
            StubBehavior::Reply(value) => Ok(value.clone()),
            StubBehavior::Fail => Err(ProviderError::Api {
                status: 500,
                message: "stub failure".to_string(),
            }),
        }
    }
}
