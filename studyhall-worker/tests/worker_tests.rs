mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::StubProvider;
use pretty_assertions::assert_eq;
use serde_json::json;
use studyhall_core::{
    GradingJob, GradingQueue, JobStatus, NewGradingJob, QueueCounts, QueueError, QueueResult,
};
use studyhall_flows::FALLBACK_FEEDBACK;
use studyhall_storage::MemoryGradingQueue;
use studyhall_worker::{BatchSummary, GradingWorker, JobOutcome, DEFAULT_BATCH_SIZE};
use uuid::Uuid;

fn new_job(question: &str) -> NewGradingJob {
    NewGradingJob {
        answer_id: Uuid::new_v4(),
        question: question.to_string(),
        criteria: "Award full marks for mentioning chlorophyll.".to_string(),
        max_score: 10.0,
        language: "en".to_string(),
        student_answer: "Plants capture light with chlorophyll.".to_string(),
    }
}

fn good_grade() -> serde_json::Value {
    json!({ "score": 7.5, "feedback": "Solid answer, missing the light-dependent step." })
}

// ===== Batch Draining Tests =====

#[tokio::test]
async fn run_once_drains_oldest_jobs_up_to_the_batch_size() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));

    let mut enqueued = Vec::new();
    for i in 0..12 {
        let job = queue
            .enqueue(new_job(&format!("Question {i}")))
            .await
            .unwrap();
        enqueued.push(job.id);
    }

    let worker = GradingWorker::new(queue.clone(), provider.clone());

    let first = worker.run_once().await.unwrap();
    assert_eq!(first.processed, DEFAULT_BATCH_SIZE);
    let first_ids: Vec<Uuid> = first.outcomes.iter().map(|o| o.job_id).collect();
    assert_eq!(first_ids, enqueued[..10].to_vec());

    let counts = queue.counts().await.unwrap();
    assert_eq!(
        counts,
        QueueCounts {
            pending: 2,
            processing: 0,
            completed: 10,
            failed: 0,
        }
    );

    let second = worker.run_once().await.unwrap();
    assert_eq!(second.processed, 2);

    let third = worker.run_once().await.unwrap();
    assert_eq!(third.processed, 0);
    assert_eq!(provider.call_count(), 12);
}

#[tokio::test]
async fn empty_queue_is_a_noop() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));
    let worker = GradingWorker::new(queue, provider.clone());

    let summary: BatchSummary = worker.run_once().await.unwrap();

    assert_eq!(summary.processed, 0);
    assert!(summary.outcomes.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn completed_jobs_are_never_regraded() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));
    let worker = GradingWorker::new(queue.clone(), provider.clone());

    for i in 0..3 {
        queue.enqueue(new_job(&format!("Question {i}"))).await.unwrap();
    }

    worker.run_once().await.unwrap();
    let again = worker.run_once().await.unwrap();

    assert_eq!(again.processed, 0);
    assert_eq!(provider.call_count(), 3);
    assert_eq!(queue.counts().await.unwrap().completed, 3);
}

#[tokio::test]
async fn batch_size_override_is_honored() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));
    let worker = GradingWorker::new(queue.clone(), provider).with_batch_size(2);

    for i in 0..5 {
        queue.enqueue(new_job(&format!("Question {i}"))).await.unwrap();
    }

    assert_eq!(worker.run_once().await.unwrap().processed, 2);
    assert_eq!(queue.counts().await.unwrap().pending, 3);
}

// ===== Grading Outcome Tests =====

#[tokio::test]
async fn successful_grade_is_recorded_on_the_job() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));
    let worker = GradingWorker::new(queue.clone(), provider);

    let job = queue.enqueue(new_job("Explain photosynthesis.")).await.unwrap();
    let summary = worker.run_once().await.unwrap();

    let outcome: &JobOutcome = &summary.outcomes[0];
    assert_eq!(outcome.job_id, job.id);
    assert_eq!(outcome.status, JobStatus::Completed);
    assert_eq!(outcome.score, Some(7.5));

    let stored = queue.get(job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.score, Some(7.5));
    assert_eq!(
        stored.feedback.as_deref(),
        Some("Solid answer, missing the light-dependent step.")
    );
    assert!(stored.processed_at.is_some());
}

#[tokio::test]
async fn provider_failure_completes_the_job_with_the_fallback() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::failing());
    let worker = GradingWorker::new(queue.clone(), provider);

    let job = queue.enqueue(new_job("Explain photosynthesis.")).await.unwrap();
    let summary = worker.run_once().await.unwrap();

    assert_eq!(summary.outcomes[0].status, JobStatus::Completed);
    assert_eq!(summary.outcomes[0].score, Some(0.0));

    let stored = queue.get(job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.score, Some(0.0));
    assert_eq!(stored.feedback.as_deref(), Some(FALLBACK_FEEDBACK));
}

#[tokio::test]
async fn ungradable_job_fields_also_fall_back() {
    let queue = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));
    let worker = GradingWorker::new(queue.clone(), provider.clone());

    let job = queue.enqueue(new_job("")).await.unwrap();
    worker.run_once().await.unwrap();

    // input validation rejects the empty question before any model call
    assert_eq!(provider.call_count(), 0);
    let stored = queue.get(job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.score, Some(0.0));
    assert_eq!(stored.feedback.as_deref(), Some(FALLBACK_FEEDBACK));
}

// ===== Claim Contention Tests =====

/// Queue wrapper that loses exactly one claim: the inner transition still
/// happens (as if another worker won it) but the caller is told `false`.
struct ContendedQueue {
    inner: Arc<MemoryGradingQueue>,
    lose_for: Uuid,
    lost: AtomicBool,
}

#[async_trait]
impl GradingQueue for ContendedQueue {
    async fn enqueue(&self, job: NewGradingJob) -> QueueResult<GradingJob> {
        self.inner.enqueue(job).await
    }

    async fn fetch_pending(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        self.inner.fetch_pending(limit).await
    }

    async fn claim(&self, id: Uuid) -> QueueResult<bool> {
        if id == self.lose_for && !self.lost.swap(true, Ordering::SeqCst) {
            self.inner.claim(id).await?;
            return Ok(false);
        }
        self.inner.claim(id).await
    }

    async fn complete(&self, id: Uuid, score: f64, feedback: &str) -> QueueResult<()> {
        self.inner.complete(id, score, feedback).await
    }

    async fn fail(&self, id: Uuid, error: &str) -> QueueResult<()> {
        self.inner.fail(id, error).await
    }

    async fn counts(&self) -> QueueResult<QueueCounts> {
        self.inner.counts().await
    }

    async fn recently_completed(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        self.inner.recently_completed(limit).await
    }
}

#[tokio::test]
async fn lost_claim_is_skipped_without_counting() {
    let inner = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));

    let first = inner.enqueue(new_job("Question 0")).await.unwrap();
    let contested = inner.enqueue(new_job("Question 1")).await.unwrap();
    let last = inner.enqueue(new_job("Question 2")).await.unwrap();

    let queue = Arc::new(ContendedQueue {
        inner: inner.clone(),
        lose_for: contested.id,
        lost: AtomicBool::new(false),
    });
    let worker = GradingWorker::new(queue, provider.clone());

    let summary = worker.run_once().await.unwrap();

    assert_eq!(summary.processed, 2);
    let ids: Vec<Uuid> = summary.outcomes.iter().map(|o| o.job_id).collect();
    assert_eq!(ids, vec![first.id, last.id]);
    assert_eq!(provider.call_count(), 2);

    // the contested job belongs to the other worker, untouched here
    let stored = inner.get(contested.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert!(stored.score.is_none());
}

// ===== Persistence Failure Tests =====

/// Queue wrapper whose first `complete` call reports a storage error.
struct FlakyCompleteQueue {
    inner: Arc<MemoryGradingQueue>,
    tripped: AtomicBool,
}

#[async_trait]
impl GradingQueue for FlakyCompleteQueue {
    async fn enqueue(&self, job: NewGradingJob) -> QueueResult<GradingJob> {
        self.inner.enqueue(job).await
    }

    async fn fetch_pending(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        self.inner.fetch_pending(limit).await
    }

    async fn claim(&self, id: Uuid) -> QueueResult<bool> {
        self.inner.claim(id).await
    }

    async fn complete(&self, id: Uuid, score: f64, feedback: &str) -> QueueResult<()> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(QueueError::Database("connection reset".to_string()));
        }
        self.inner.complete(id, score, feedback).await
    }

    async fn fail(&self, id: Uuid, error: &str) -> QueueResult<()> {
        self.inner.fail(id, error).await
    }

    async fn counts(&self) -> QueueResult<QueueCounts> {
        self.inner.counts().await
    }

    async fn recently_completed(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        self.inner.recently_completed(limit).await
    }
}

#[tokio::test]
async fn persistence_failure_fails_the_job_and_continues_the_batch() {
    let inner = Arc::new(MemoryGradingQueue::new());
    let provider = Arc::new(StubProvider::replying(good_grade()));

    let broken = inner.enqueue(new_job("Question 0")).await.unwrap();
    let healthy = inner.enqueue(new_job("Question 1")).await.unwrap();

    let queue = Arc::new(FlakyCompleteQueue {
        inner: inner.clone(),
        tripped: AtomicBool::new(false),
    });
    let worker = GradingWorker::new(queue, provider);

    let summary = worker.run_once().await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.outcomes[0].status, JobStatus::Failed);
    assert!(summary.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("connection reset"));
    assert_eq!(summary.outcomes[1].status, JobStatus::Completed);

    let failed = inner.get(broken.id).await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(failed.error.is_some());

    let completed = inner.get(healthy.id).await.unwrap();
    assert_eq!(completed.status, JobStatus::Completed);
    assert_eq!(completed.score, Some(7.5));
}
