use pretty_assertions::assert_eq;
use studyhall_core::{GradingJob, JobStatus, NewGradingJob, QueueCounts, SchemaViolation};
use uuid::Uuid;

fn sample_spec() -> NewGradingJob {
    NewGradingJob {
        answer_id: Uuid::new_v4(),
        question: "What is 2+2?".to_string(),
        criteria: "Correct numeric answer required".to_string(),
        max_score: 10.0,
        language: "en".to_string(),
        student_answer: "4".to_string(),
    }
}

// ===== JobStatus Tests =====

#[test]
fn test_status_round_trips_through_str() {
    for status in [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ] {
        assert_eq!(JobStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(JobStatus::parse("archived"), None);
}

#[test]
fn test_status_serde_uses_snake_case() {
    let json = serde_json::to_string(&JobStatus::Processing).unwrap();
    assert_eq!(json, "\"processing\"");

    let status: JobStatus = serde_json::from_str("\"failed\"").unwrap();
    assert_eq!(status, JobStatus::Failed);
}

#[test]
fn test_terminal_states_admit_no_transitions() {
    for terminal in [JobStatus::Completed, JobStatus::Failed] {
        assert!(terminal.is_terminal());
        for next in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

#[test]
fn test_state_machine_allows_only_documented_transitions() {
    assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
    assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
    assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));

    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Failed));
    assert!(!JobStatus::Processing.can_transition_to(JobStatus::Pending));
}

// ===== GradingJob Tests =====

#[test]
fn test_new_job_starts_pending_and_unscored() {
    let spec = sample_spec();
    let job = GradingJob::new(spec.clone());

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.answer_id, spec.answer_id);
    assert!(job.score.is_none());
    assert!(job.feedback.is_none());
    assert!(job.error.is_none());
    assert!(job.processed_at.is_none());
}

#[test]
fn test_job_serialization_round_trip() {
    let job = GradingJob::new(sample_spec());
    let serialized = serde_json::to_string(&job).unwrap();
    let deserialized: GradingJob = serde_json::from_str(&serialized).unwrap();

    assert_eq!(job.id, deserialized.id);
    assert_eq!(job.status, deserialized.status);
    assert_eq!(job.question, deserialized.question);
    assert_eq!(job.created_at, deserialized.created_at);
}

// ===== QueueCounts Tests =====

#[test]
fn test_queue_counts_total() {
    let counts = QueueCounts {
        pending: 3,
        processing: 1,
        completed: 10,
        failed: 2,
    };
    assert_eq!(counts.total(), 16);
    assert_eq!(QueueCounts::default().total(), 0);
}

// ===== SchemaViolation Tests =====

#[test]
fn test_schema_violation_display_names_the_field() {
    let violation = SchemaViolation::new("score", "must be between 0 and 10");
    let message = violation.to_string();
    assert!(message.contains("score"));
    assert!(message.contains("between 0 and 10"));
}
