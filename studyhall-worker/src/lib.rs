//! Grading queue worker.
//!
//! One invocation drains at most [`DEFAULT_BATCH_SIZE`] pending jobs,
//! oldest first, grading each through the open-question flow. Jobs are
//! owned via an atomic claim, so overlapping invocations (two cron
//! triggers, say) never grade the same job twice. Each job's result is
//! committed independently; one job's failure never aborts the batch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use studyhall_core::{GradingJob, GradingQueue, JobStatus, QueueResult};
use studyhall_flows::{grade_or_fallback, GradeInput};
use studyhall_provider::ModelProvider;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Result of processing a single job within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub score: Option<f64>,
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn completed(job_id: Uuid, score: f64) -> Self {
        Self {
            job_id,
            status: JobStatus::Completed,
            score: Some(score),
            error: None,
        }
    }

    pub fn failed(job_id: Uuid, error: String) -> Self {
        Self {
            job_id,
            status: JobStatus::Failed,
            score: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub outcomes: Vec<JobOutcome>,
}

impl BatchSummary {
    pub fn new(outcomes: Vec<JobOutcome>) -> Self {
        Self {
            processed: outcomes.len(),
            outcomes,
        }
    }
}

pub struct GradingWorker {
    queue: Arc<dyn GradingQueue>,
    provider: Arc<dyn ModelProvider>,
    batch_size: usize,
}

impl GradingWorker {
    pub fn new(queue: Arc<dyn GradingQueue>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            queue,
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Process up to `batch_size` pending jobs, stopping early when the
    /// queue is empty. Re-invoking is always safe: only jobs claimed from
    /// `pending` are touched, so an empty queue is a no-op and completed
    /// jobs are never re-graded.
    pub async fn run_once(&self) -> QueueResult<BatchSummary> {
        let mut outcomes = Vec::new();

        while outcomes.len() < self.batch_size {
            let Some(job) = self.queue.fetch_pending(1).await?.into_iter().next() else {
                debug!("no pending jobs remain, stopping early");
                break;
            };

            if !self.queue.claim(job.id).await? {
                // another worker got there first; the job is no longer
                // pending so the next fetch moves past it
                debug!(job_id = %job.id, "lost claim to a concurrent worker");
                continue;
            }

            outcomes.push(self.process(job).await);
        }

        info!(processed = outcomes.len(), "grading batch finished");
        Ok(BatchSummary::new(outcomes))
    }

    async fn process(&self, job: GradingJob) -> JobOutcome {
        debug!(job_id = %job.id, "grading claimed job");

        let input = GradeInput {
            question: job.question,
            criteria: job.criteria,
            max_score: job.max_score,
            language: job.language,
            student_answer: job.student_answer,
        };

        // Any flow failure becomes the documented {0, apology} fallback,
        // so a single ungradable submission never blocks the batch.
        let graded = grade_or_fallback(self.provider.as_ref(), input).await;

        match self
            .queue
            .complete(job.id, graded.score, &graded.feedback)
            .await
        {
            Ok(()) => JobOutcome::completed(job.id, graded.score),
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "could not persist grading result");
                if let Err(fail_err) = self.queue.fail(job.id, &e.to_string()).await {
                    warn!(job_id = %job.id, error = %fail_err, "could not mark job failed");
                }
                JobOutcome::failed(job.id, e.to_string())
            }
        }
    }
}
