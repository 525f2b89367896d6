use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

/// Marker used in a cloze to stand in for the masked answer span.
pub const CLOZE_BLANK: &str = "_____";

pub const DEFAULT_CARD_COUNT: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FlashcardInput {
    #[validate(length(min = 1))]
    pub source_text: String,
    /// Optional topic the card should concentrate on.
    pub focus: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FlashcardBatchInput {
    #[validate(length(min = 1))]
    pub source_text: String,
    #[validate(range(min = 1, max = 50))]
    pub card_count: Option<u32>,
}

impl FlashcardBatchInput {
    pub fn card_count(&self) -> u32 {
        self.card_count.unwrap_or(DEFAULT_CARD_COUNT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    /// Fill-in-the-blank derivative of `back` with the answer span masked
    /// by [`CLOZE_BLANK`].
    pub cloze: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardBatchOutput {
    pub cards: Vec<Flashcard>,
}

fn card_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "front": {"type": "string"},
            "back": {"type": "string"},
            "cloze": {"type": "string"},
            "source": {"type": ["string", "null"]},
        },
        "required": ["front", "back", "cloze"],
    })
}

fn card_instructions() -> &'static str {
    "Each card has a question on the front and a concise answer on the back. \
     Also produce a cloze: the back restated with the key answer span replaced \
     by `_____`. When a card comes from a specific passage, cite it in the \
     card's source field."
}

fn validate_card(prefix: &str, card: &Flashcard) -> Result<(), SchemaViolation> {
    non_empty(&format!("{prefix}.front"), &card.front)?;
    non_empty(&format!("{prefix}.back"), &card.back)?;
    non_empty(&format!("{prefix}.cloze"), &card.cloze)?;

    if !card.cloze.contains(CLOZE_BLANK) {
        return Err(SchemaViolation::new(
            format!("{prefix}.cloze"),
            format!("must mask the answer span with `{CLOZE_BLANK}`"),
        ));
    }
    if card
        .cloze
        .to_lowercase()
        .contains(&card.back.trim().to_lowercase())
    {
        return Err(SchemaViolation::new(
            format!("{prefix}.cloze"),
            "must not contain the unmasked answer",
        ));
    }

    Ok(())
}

pub struct FlashcardFlow;

impl GenerationFlow for FlashcardFlow {
    type Input = FlashcardInput;
    type Output = Flashcard;

    fn name(&self) -> &'static str {
        "flashcard_generation"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You create study flashcards from source material. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        let focus_section = match &input.focus {
            Some(focus) if !focus.trim().is_empty() => {
                format!("\nConcentrate on this topic: {focus}.\n")
            }
            _ => String::new(),
        };

        format!(
            "Create one flashcard from the study material below. {instructions}\n\
             {focus_section}\n\
             Study material:\n{source}",
            instructions = card_instructions(),
            focus_section = focus_section,
            source = input.source_text,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        card_schema()
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        _input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        validate_card("card", output)
    }
}

pub struct FlashcardBatchFlow;

impl GenerationFlow for FlashcardBatchFlow {
    type Input = FlashcardBatchInput;
    type Output = FlashcardBatchOutput;

    fn name(&self) -> &'static str {
        "flashcard_batch_generation"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You create study flashcards from source material. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        format!(
            "Create {count} flashcards covering the study material below. {instructions}\n\n\
             Study material:\n{source}",
            count = input.card_count(),
            instructions = card_instructions(),
            source = input.source_text,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "cards": {
                    "type": "array",
                    "minItems": 1,
                    "items": card_schema(),
                },
            },
            "required": ["cards"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        if output.cards.is_empty() {
            return Err(SchemaViolation::new("cards", "must not be empty"));
        }
        let requested = input.card_count() as usize;
        if output.cards.len() > requested {
            return Err(SchemaViolation::new(
                "cards",
                format!("expected at most {requested} cards, got {}", output.cards.len()),
            ));
        }
        for (i, card) in output.cards.iter().enumerate() {
            validate_card(&format!("cards[{i}]"), card)?;
        }
        Ok(())
    }
}
