use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use studyhall_core::{
    GradingJob, GradingQueue, JobStatus, NewGradingJob, QueueCounts, QueueError, QueueResult,
};
use tracing::debug;
use uuid::Uuid;

/// Queue table DDL. Jobs are an audit trail and are never deleted.
pub const GRADING_JOBS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS grading_jobs (
    id UUID PRIMARY KEY,
    answer_id UUID NOT NULL,
    question TEXT NOT NULL,
    criteria TEXT NOT NULL,
    max_score DOUBLE PRECISION NOT NULL,
    language TEXT NOT NULL,
    student_answer TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    score DOUBLE PRECISION,
    feedback TEXT,
    error TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    processed_at TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS idx_grading_jobs_status_created
    ON grading_jobs (status, created_at);
"#;

pub async fn create_pool(database_url: &str) -> QueueResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> QueueResult<()> {
    sqlx::raw_sql(GRADING_JOBS_DDL).execute(pool).await?;
    Ok(())
}

pub struct PgGradingQueue {
    pool: PgPool,
}

impl PgGradingQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: Uuid) -> QueueResult<JobStatus> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM grading_jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let status = status.ok_or(QueueError::NotFound(id))?;
        parse_status(&status)
    }
}

#[async_trait]
impl GradingQueue for PgGradingQueue {
    async fn enqueue(&self, spec: NewGradingJob) -> QueueResult<GradingJob> {
        let job = GradingJob::new(spec);

        sqlx::query(
            r#"
            INSERT INTO grading_jobs (
                id, answer_id, question, criteria, max_score, language,
                student_answer, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id)
        .bind(job.answer_id)
        .bind(&job.question)
        .bind(&job.criteria)
        .bind(job.max_score)
        .bind(&job.language)
        .bind(&job.student_answer)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        debug!(job_id = %job.id, "enqueued grading job");
        Ok(job)
    }

    async fn fetch_pending(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        let rows = sqlx::query(
            r#"
            SELECT id, answer_id, question, criteria, max_score, language,
                   student_answer, status, score, feedback, error,
                   created_at, processed_at
            FROM grading_jobs
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_job).collect()
    }

    async fn claim(&self, id: Uuid) -> QueueResult<bool> {
        // Conditional update: of any number of concurrent claimants,
        // exactly one sees rows_affected == 1.
        let result = sqlx::query(
            "UPDATE grading_jobs SET status = 'processing' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish a lost claim from a missing job.
        self.current_status(id).await?;
        Ok(false)
    }

    async fn complete(&self, id: Uuid, score: f64, feedback: &str) -> QueueResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE grading_jobs
            SET status = 'completed', score = $2, feedback = $3, processed_at = now()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(feedback)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        Err(QueueError::InvalidTransition {
            id,
            from: self.current_status(id).await?,
            to: JobStatus::Completed,
        })
    }

    async fn fail(&self, id: Uuid, error: &str) -> QueueResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE grading_jobs
            SET status = 'failed', error = $2, processed_at = now()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        Err(QueueError::InvalidTransition {
            id,
            from: self.current_status(id).await?,
            to: JobStatus::Failed,
        })
    }

    async fn counts(&self) -> QueueResult<QueueCounts> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM grading_jobs GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut counts = QueueCounts::default();
        for row in rows {
            let status: String = row.get("status");
            let count: i64 = row.get("count");
            match parse_status(&status)? {
                JobStatus::Pending => counts.pending = count,
                JobStatus::Processing => counts.processing = count,
                JobStatus::Completed => counts.completed = count,
                JobStatus::Failed => counts.failed = count,
            }
        }
        Ok(counts)
    }

    async fn recently_completed(&self, limit: i64) -> QueueResult<Vec<GradingJob>> {
        let rows = sqlx::query(
            r#"
            SELECT id, answer_id, question, criteria, max_score, language,
                   student_answer, status, score, feedback, error,
                   created_at, processed_at
            FROM grading_jobs
            WHERE status = 'completed'
            ORDER BY processed_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_job).collect()
    }
}

fn parse_status(s: &str) -> QueueResult<JobStatus> {
    JobStatus::parse(s).ok_or_else(|| QueueError::Database(format!("unknown job status `{s}`")))
}

fn row_to_job(row: PgRow) -> QueueResult<GradingJob> {
    let status: String = row.get("status");
    Ok(GradingJob {
        id: row.get("id"),
        answer_id: row.get("answer_id"),
        question: row.get("question"),
        criteria: row.get("criteria"),
        max_score: row.get("max_score"),
        language: row.get("language"),
        student_answer: row.get("student_answer"),
        status: parse_status(&status)?,
        score: row.get::<Option<f64>, _>("score"),
        feedback: row.get::<Option<String>, _>("feedback"),
        error: row.get::<Option<String>, _>("error"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        processed_at: row.get::<Option<DateTime<Utc>>, _>("processed_at"),
    })
}
