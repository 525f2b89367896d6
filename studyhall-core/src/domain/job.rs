use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a grading job. `Pending` is the only initial state;
/// `Completed` and `Failed` are terminal and are never left again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the `self -> next` transition is allowed by the job state
    /// machine.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued open-ended answer awaiting automated scoring. Jobs are kept
/// after processing as an audit trail and are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingJob {
    pub id: Uuid,
    pub answer_id: Uuid,
    pub question: String,
    pub criteria: String,
    pub max_score: f64,
    pub language: String,
    pub student_answer: String,
    pub status: JobStatus,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl GradingJob {
    pub fn new(spec: NewGradingJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            answer_id: spec.answer_id,
            question: spec.question,
            criteria: spec.criteria,
            max_score: spec.max_score,
            language: spec.language,
            student_answer: spec.student_answer,
            status: JobStatus::Pending,
            score: None,
            feedback: None,
            error: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }
}

/// Everything needed to enqueue a job; the queue assigns id, status and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGradingJob {
    pub answer_id: Uuid,
    pub question: String,
    pub criteria: String,
    pub max_score: f64,
    pub language: String,
    pub student_answer: String,
}

/// Per-status queue population, as reported by the status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueCounts {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

impl QueueCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.processing + self.completed + self.failed
    }
}
