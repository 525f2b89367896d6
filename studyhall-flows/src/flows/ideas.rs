use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

pub const DEFAULT_IDEA_COUNT: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IdeasInput {
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub grade_level: String,
    #[validate(range(min = 1, max = 20))]
    pub idea_count: Option<u32>,
}

impl IdeasInput {
    pub fn idea_count(&self) -> u32 {
        self.idea_count.unwrap_or(DEFAULT_IDEA_COUNT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeasOutput {
    pub ideas: Vec<ClassIdea>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassIdea {
    pub title: String,
    pub description: String,
    pub activities: Vec<String>,
}

pub struct ClassIdeasFlow;

impl GenerationFlow for ClassIdeasFlow {
    type Input = IdeasInput;
    type Output = IdeasOutput;

    fn name(&self) -> &'static str {
        "class_ideas"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You help teachers brainstorm engaging lesson ideas. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        format!(
            "Brainstorm {count} lesson ideas for teaching {subject} to {grade_level} \
             students. For each idea give a short title, a one-paragraph description, \
             and a list of concrete classroom activities.",
            count = input.idea_count(),
            subject = input.subject,
            grade_level = input.grade_level,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "ideas": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "description": {"type": "string"},
                            "activities": {
                                "type": "array",
                                "minItems": 1,
                                "items": {"type": "string"},
                            },
                        },
                        "required": ["title", "description", "activities"],
                    },
                },
            },
            "required": ["ideas"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        if output.ideas.is_empty() {
            return Err(SchemaViolation::new("ideas", "must not be empty"));
        }
        let requested = input.idea_count() as usize;
        if output.ideas.len() > requested {
            return Err(SchemaViolation::new(
                "ideas",
                format!("expected at most {requested} ideas, got {}", output.ideas.len()),
            ));
        }

        for (i, idea) in output.ideas.iter().enumerate() {
            non_empty(&format!("ideas[{i}].title"), &idea.title)?;
            non_empty(&format!("ideas[{i}].description"), &idea.description)?;
            if idea.activities.is_empty() {
                return Err(SchemaViolation::new(
                    format!("ideas[{i}].activities"),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }
}
