use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

pub const DEFAULT_QUESTION_COUNT: u32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuizInput {
    #[validate(length(min = 1))]
    pub source_text: String,
    #[validate(range(min = 1, max = 50))]
    pub question_count: Option<u32>,
    /// Ids of previously generated questions the new quiz must not repeat.
    pub existing_question_ids: Option<Vec<String>>,
}

impl QuizInput {
    pub fn question_count(&self) -> u32 {
        self.question_count.unwrap_or(DEFAULT_QUESTION_COUNT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOutput {
    pub title: String,
    pub description: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub text: String,
    pub options: Vec<QuizOption>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
}

pub struct QuizFlow;

impl GenerationFlow for QuizFlow {
    type Input = QuizInput;
    type Output = QuizOutput;

    fn name(&self) -> &'static str {
        "quiz_generation"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You are an experienced teacher writing quizzes from study material. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        let exclusion_section = match &input.existing_question_ids {
            Some(ids) if !ids.is_empty() => format!(
                "\nDo not repeat any of the questions already generated for this material \
                 (ids: {}).\n",
                ids.join(", ")
            ),
            _ => String::new(),
        };

        format!(
            "Create a quiz with {count} multiple-choice questions from the study material \
             below. Give the quiz a short title and a one-sentence description. Each question \
             must have 3 or 4 answer options with exactly one correct option. When a question \
             is taken from a specific passage, cite it in the question's source field.\n\
             {exclusion_section}\n\
             Study material:\n{source}",
            count = input.question_count(),
            exclusion_section = exclusion_section,
            source = input.source_text,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "description": {"type": "string"},
                "questions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "text": {"type": "string"},
                            "options": {
                                "type": "array",
                                "minItems": 3,
                                "maxItems": 4,
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "text": {"type": "string"},
                                        "is_correct": {"type": "boolean"},
                                    },
                                    "required": ["text", "is_correct"],
                                },
                            },
                            "source": {"type": ["string", "null"]},
                        },
                        "required": ["text", "options"],
                    },
                },
            },
            "required": ["title", "description", "questions"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        non_empty("title", &output.title)?;

        if output.questions.is_empty() {
            return Err(SchemaViolation::new("questions", "must not be empty"));
        }
        let requested = input.question_count() as usize;
        if output.questions.len() > requested {
            return Err(SchemaViolation::new(
                "questions",
                format!(
                    "expected at most {requested} questions, got {}",
                    output.questions.len()
                ),
            ));
        }

        for (i, question) in output.questions.iter().enumerate() {
            non_empty(&format!("questions[{i}].text"), &question.text)?;

            let option_count = question.options.len();
            if !(3..=4).contains(&option_count) {
                return Err(SchemaViolation::new(
                    format!("questions[{i}].options"),
                    format!("expected 3 or 4 options, got {option_count}"),
                ));
            }

            let correct = question.options.iter().filter(|o| o.is_correct).count();
            if correct != 1 {
                return Err(SchemaViolation::new(
                    format!("questions[{i}].options"),
                    format!("expected exactly one correct option, got {correct}"),
                ));
            }

            for (j, option) in question.options.iter().enumerate() {
                non_empty(&format!("questions[{i}].options[{j}].text"), &option.text)?;
            }
        }

        Ok(())
    }
}
