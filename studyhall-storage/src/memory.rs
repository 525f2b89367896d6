use async_trait::async_trait;
use chrono::Utc;
use studyhall_core::{
    GradingJob, GradingQueue, JobStatus, NewGradingJob, QueueCounts, QueueError, QueueResult,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory queue with the same transition rules as the Postgres queue.
/// Insertion order doubles as creation order, so pending fetches are
/// oldest first.
#[derive(Default)]
pub struct MemoryGradingQueue {
    jobs: Mutex<Vec<GradingJob>>,
}

impl MemoryGradingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a single job, for assertions in tests.
    pub async fn get(&self, id: Uuid) -> Option<GradingJob> {
        self.jobs.lock().await.iter().find(|j| j.id == id).cloned()
    }
}

#[async_trait]
impl GradingQueue for MemoryGradingQueue {
    async fn enqueue(&self, spec: NewGradingJob) -> QueueResult<GradingJob> {
        let job = GradingJob::new(spec);
        self.jobs.lock().await.push(job.clone());
        Ok(job)
    }

    async fn fetch_pending(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let jobs = self.jobs.lock().await;
        Ok(jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn claim(&self, id: Uuid) -> QueueResult<bool> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(QueueError::NotFound(id))?;

        if job.status == JobStatus::Pending {
            job.status = JobStatus::Processing;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn complete(&self, id: Uuid, score: f64, feedback: &str) -> QueueResult<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(QueueError::NotFound(id))?;

        if !job.status.can_transition_to(JobStatus::Completed) {
            return Err(QueueError::InvalidTransition {
                id,
                from: job.status,
                to: JobStatus::Completed,
            });
        }

        job.status = JobStatus::Completed;
        job.score = Some(score);
        job.feedback = Some(feedback.to_string());
        job.processed_at = Some(Utc::now());
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str) -> QueueResult<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(QueueError::NotFound(id))?;

        if !job.status.can_transition_to(JobStatus::Failed) {
            return Err(QueueError::InvalidTransition {
                id,
                from: job.status,
                to: JobStatus::Failed,
            });
        }

        job.status = JobStatus::Failed;
        job.error = Some(error.to_string());
        job.processed_at = Some(Utc::now());
        Ok(())
    }

    async fn counts(&self) -> QueueResult<QueueCounts> {
        let jobs = self.jobs.lock().await;
        let mut counts = QueueCounts::default();
        for job in jobs.iter() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        Ok(counts)
    }

    async fn recently_completed(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let jobs = self.jobs.lock().await;
        let mut completed: Vec<GradingJob> = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .cloned()
            .collect();
        completed.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        completed.truncate(limit as usize);
        Ok(completed)
    }
}
