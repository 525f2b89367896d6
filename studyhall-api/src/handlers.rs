use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use studyhall_core::NewGradingJob;
use studyhall_worker::{BatchSummary, GradingWorker};
use validator::Validate;

use crate::{
    dto::{EnqueueJobRequest, GradingJobResponse, ProcessRequest, StatusQuery, StatusResponse},
    error::{ApiError, ApiResult},
    AppState,
};

/// Worker trigger. One call drains one batch; the scheduler decides the
/// cadence. The body is optional so a bare scheduler POST works.
pub async fn process(
    State(state): State<AppState>,
    payload: Option<Json<ProcessRequest>>,
) -> ApiResult<Json<BatchSummary>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    if let Some(expected) = &state.worker_secret {
        if payload.secret.as_deref() != Some(expected.as_str()) {
            return Err(ApiError::Unauthorized);
        }
    }

    let worker = GradingWorker::new(state.queue.clone(), state.provider.clone())
        .with_batch_size(state.batch_size);
    let summary = worker.run_once().await?;

    Ok(Json(summary))
}

pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<StatusResponse>> {
    query.validate()?;

    let counts = state.queue.counts().await?;
    let recent = state
        .queue
        .recently_completed(query.limit())
        .await?
        .into_iter()
        .map(GradingJobResponse::from)
        .collect();

    Ok(Json(StatusResponse { counts, recent }))
}

pub async fn enqueue(
    State(state): State<AppState>,
    Json(payload): Json<EnqueueJobRequest>,
) -> ApiResult<(StatusCode, Json<GradingJobResponse>)> {
    payload.validate()?;

    let job = state
        .queue
        .enqueue(NewGradingJob {
            answer_id: payload.answer_id,
            question: payload.question,
            criteria: payload.criteria,
            max_score: payload.max_score,
            language: payload.language,
            student_answer: payload.student_answer,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(GradingJobResponse::from(job))))
}
