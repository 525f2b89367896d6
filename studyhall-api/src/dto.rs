use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyhall_core::{GradingJob, JobStatus, QueueCounts};
use uuid::Uuid;
use validator::Validate;

/// Body of the worker trigger. Schedulers without a configured secret POST
/// an empty object.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct StatusQuery {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

impl StatusQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub counts: QueueCounts,
    pub recent: Vec<GradingJobResponse>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EnqueueJobRequest {
    pub answer_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub question: String,
    #[validate(length(min = 1, max = 4000))]
    pub criteria: String,
    #[validate(range(min = 0.0))]
    pub max_score: f64,
    #[validate(length(min = 1, max = 16))]
    pub language: String,
    #[validate(length(max = 20000))]
    pub student_answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradingJobResponse {
    pub id: Uuid,
    pub answer_id: Uuid,
    pub status: JobStatus,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<GradingJob> for GradingJobResponse {
    fn from(job: GradingJob) -> Self {
        Self {
            id: job.id,
            answer_id: job.answer_id,
            status: job.status,
            score: job.score,
            feedback: job.feedback,
            error: job.error,
            created_at: job.created_at,
            processed_at: job.processed_at,
        }
    }
}
