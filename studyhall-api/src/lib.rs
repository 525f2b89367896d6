//! HTTP surface for the grading queue.
//!
//! Three routes under `/grading`: a worker trigger meant to be hit by an
//! external scheduler, a queue status view, and job submission. Mount the
//! returned router under the versioned prefix in the server binary.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use studyhall_core::GradingQueue;
use studyhall_provider::ModelProvider;

pub mod dto;
pub mod error;
pub mod handlers;

pub use dto::*;
pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn GradingQueue>,
    pub provider: Arc<dyn ModelProvider>,
    pub batch_size: usize,
    /// When set, the worker trigger requires the caller to present this
    /// value; status and submission stay open.
    pub worker_secret: Option<String>,
}

impl AppState {
    pub fn new(queue: Arc<dyn GradingQueue>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            queue,
            provider,
            batch_size: studyhall_worker::DEFAULT_BATCH_SIZE,
            worker_secret: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_worker_secret(mut self, secret: Option<String>) -> Self {
        self.worker_secret = secret;
        self
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/grading/process", post(handlers::process))
        .route("/grading/status", get(handlers::status))
        .route("/grading/jobs", post(handlers::enqueue))
        .with_state(state)
}
