//! Open-question grading.
//!
//! This is the one flow with a documented fallback: through
//! [`grade_or_fallback`], any failure yields `{score: 0, apology}` so a
//! single ungradable submission never blocks a batch. The plain
//! [`GenerationFlow::execute`] path still surfaces errors.

use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use studyhall_provider::ModelProvider;
use tracing::warn;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

/// Substituted feedback when grading fails outright.
pub const FALLBACK_FEEDBACK: &str =
    "We're sorry - this answer could not be graded automatically. \
     A teacher will review it and provide a score and feedback.";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GradeInput {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(min = 1))]
    pub criteria: String,
    #[validate(range(min = 0.0))]
    pub max_score: f64,
    /// Language the feedback must be written in, e.g. "en" or "Spanish".
    #[validate(length(min = 1))]
    pub language: String,
    pub student_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeOutput {
    pub score: f64,
    pub feedback: String,
}

impl GradeOutput {
    pub fn fallback() -> Self {
        Self {
            score: 0.0,
            feedback: FALLBACK_FEEDBACK.to_string(),
        }
    }
}

pub struct OpenQuestionGradingFlow;

impl GenerationFlow for OpenQuestionGradingFlow {
    type Input = GradeInput;
    type Output = GradeOutput;

    fn name(&self) -> &'static str {
        "open_question_grading"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You grade student answers to open-ended questions, strictly following the given criteria. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        format!(
            "Grade the student's answer to the question below.\n\n\
             Question: {question}\n\
             Grading criteria: {criteria}\n\
             Maximum score: {max_score}\n\n\
             Student's answer:\n{answer}\n\n\
             Assign a score between 0 and {max_score} and write short, constructive \
             feedback for the student. Write the feedback in {language}.",
            question = input.question,
            criteria = input.criteria,
            max_score = input.max_score,
            answer = input.student_answer,
            language = input.language,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "score": {"type": "number", "minimum": 0},
                "feedback": {"type": "string"},
            },
            "required": ["score", "feedback"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        if !output.score.is_finite() || output.score < 0.0 || output.score > input.max_score {
            return Err(SchemaViolation::new(
                "score",
                format!(
                    "must be between 0 and {}, got {}",
                    input.max_score, output.score
                ),
            ));
        }
        non_empty("feedback", &output.feedback)
    }
}

/// Grade an answer, substituting the fixed fallback result on any failure.
/// This is the entry point the queue worker uses; no other flow clamps or
/// fabricates results this way.
pub async fn grade_or_fallback(provider: &dyn ModelProvider, input: GradeInput) -> GradeOutput {
    match OpenQuestionGradingFlow.execute(provider, input).await {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "grading flow failed, substituting fallback result");
            GradeOutput::fallback()
        }
    }
}
