use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoteStyle {
    Structured,
    Bullet,
    Mindmap,
    Timeline,
}

impl NoteStyle {
    /// Structured notes read as prose paragraphs; every other style breaks
    /// a section into discrete blocks.
    pub fn expects_blocks(&self) -> bool {
        !matches!(self, NoteStyle::Structured)
    }

    fn guidance(&self) -> &'static str {
        match self {
            NoteStyle::Structured => {
                "Write each section as one coherent paragraph of prose."
            }
            NoteStyle::Bullet => {
                "Write each section as a list of short bullet points."
            }
            NoteStyle::Mindmap => {
                "Write each section as a list of branches radiating from the section topic."
            }
            NoteStyle::Timeline => {
                "Write each section as a list of chronological entries, earliest first."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoteLength {
    Short,
    Medium,
    Long,
}

impl NoteLength {
    /// Inclusive (min, max) section counts per length tier.
    pub fn section_bounds(&self) -> (usize, usize) {
        match self {
            NoteLength::Short => (2, 3),
            NoteLength::Medium => (4, 6),
            NoteLength::Long => (6, 8),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotesInput {
    #[validate(length(min = 1))]
    pub source_text: String,
    pub style: NoteStyle,
    pub length: NoteLength,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesOutput {
    pub sections: Vec<NoteSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSection {
    pub title: String,
    pub content: NoteContent,
}

/// A section body is either one prose block or a list of blocks, depending
/// on the requested style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteContent {
    Text(String),
    Blocks(Vec<String>),
}

pub struct NotesFlow;

impl GenerationFlow for NotesFlow {
    type Input = NotesInput;
    type Output = NotesOutput;

    fn name(&self) -> &'static str {
        "notes_generation"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You condense study material into well-organized notes. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        let (min, max) = input.length.section_bounds();
        format!(
            "Condense the study material below into notes of {min} to {max} titled \
             sections. {guidance}\n\n\
             Study material:\n{source}",
            guidance = input.style.guidance(),
            source = input.source_text,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        // content is style-dependent; accept both shapes on the wire and
        // enforce the right one in validate_output
        let content_schema = json!({"anyOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "string"}},
        ]});

        json!({
            "type": "object",
            "properties": {
                "sections": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "content": content_schema,
                        },
                        "required": ["title", "content"],
                    },
                },
            },
            "required": ["sections"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        let (min, max) = input.length.section_bounds();
        let count = output.sections.len();
        if !(min..=max).contains(&count) {
            return Err(SchemaViolation::new(
                "sections",
                format!("expected between {min} and {max} sections, got {count}"),
            ));
        }

        for (i, section) in output.sections.iter().enumerate() {
            non_empty(&format!("sections[{i}].title"), &section.title)?;

            match (&section.content, input.style.expects_blocks()) {
                (NoteContent::Text(text), false) => {
                    non_empty(&format!("sections[{i}].content"), text)?;
                }
                (NoteContent::Blocks(blocks), true) => {
                    if blocks.is_empty() {
                        return Err(SchemaViolation::new(
                            format!("sections[{i}].content"),
                            "must not be empty",
                        ));
                    }
                    for (j, block) in blocks.iter().enumerate() {
                        non_empty(&format!("sections[{i}].content[{j}]"), block)?;
                    }
                }
                (NoteContent::Text(_), true) => {
                    return Err(SchemaViolation::new(
                        format!("sections[{i}].content"),
                        "this style requires a list of blocks",
                    ));
                }
                (NoteContent::Blocks(_), false) => {
                    return Err(SchemaViolation::new(
                        format!("sections[{i}].content"),
                        "structured style requires a single text block",
                    ));
                }
            }
        }

        Ok(())
    }
}
