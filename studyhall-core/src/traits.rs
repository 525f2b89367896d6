use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{GradingJob, NewGradingJob, QueueCounts};
use crate::error::QueueResult;

/// Persistence seam for the grading queue. Implementations must make
/// `claim` an atomic pending -> processing transition so that exactly one
/// of any number of concurrent callers wins a given job.
#[async_trait]
pub trait GradingQueue: Send + Sync {
    /// Insert a new job in `Pending` state.
    async fn enqueue(&self, job: NewGradingJob) -> QueueResult<GradingJob>;

    /// Fetch up to `limit` pending jobs, oldest first.
    async fn fetch_pending(&self, limit: i64) -> QueueResult<Vec<GradingJob>>;

    /// Conditionally move a job from `Pending` to `Processing`. Returns
    /// `true` for the caller that won the claim, `false` if the job was no
    /// longer pending.
    async fn claim(&self, id: Uuid) -> QueueResult<bool>;

    /// Record a grading result and move the job to `Completed`. The job
    /// must currently be `Processing`.
    async fn complete(&self, id: Uuid, score: f64, feedback: &str) -> QueueResult<()>;

    /// Record a failure and move the job to `Failed`. The job must
    /// currently be `Processing`.
    async fn fail(&self, id: Uuid, error: &str) -> QueueResult<()>;

    /// Per-status job counts.
    async fn counts(&self) -> QueueResult<QueueCounts>;

    /// Most recently completed jobs, newest first.
    async fn recently_completed(&self, limit: i64) -> QueueResult<Vec<GradingJob>>;
}
