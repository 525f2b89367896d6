//! Multiple-choice conversion of a flashcard.
//!
//! The model is only asked for plausible distractors; the card's back is
//! reused verbatim as the correct option, and the assembled options are
//! shuffled so the correct answer's position is not predictable.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use studyhall_provider::ModelProvider;
use validator::Validate;

use crate::error::FlowResult;
use crate::flow::{non_empty, GenerationFlow};

const OPTION_IDS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct McqInput {
    #[validate(length(min = 1))]
    pub front: String,
    #[validate(length(min = 1))]
    pub back: String,
}

/// Raw model output: intentionally wrong but plausible options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistractorSet {
    pub distractors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqQuestion {
    pub prompt: String,
    pub options: Vec<McqOption>,
    pub correct_option_id: String,
}

pub struct McqFromFlashcardFlow;

impl GenerationFlow for McqFromFlashcardFlow {
    type Input = McqInput;
    type Output = DistractorSet;

    fn name(&self) -> &'static str {
        "mcq_distractors"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You write plausible but incorrect answer options for quiz questions. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        format!(
            "A flashcard asks: {front}\n\
             The correct answer is: {back}\n\n\
             Write 2 or 3 distractors: answers that are clearly wrong but plausible enough \
             that a student who has not studied might pick them. Distractors must not \
             restate the correct answer.",
            front = input.front,
            back = input.back,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "distractors": {
                    "type": "array",
                    "minItems": 2,
                    "maxItems": 3,
                    "items": {"type": "string"},
                },
            },
            "required": ["distractors"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        let count = output.distractors.len();
        if !(2..=3).contains(&count) {
            return Err(SchemaViolation::new(
                "distractors",
                format!("expected 2 or 3 distractors, got {count}"),
            ));
        }

        let back = input.back.trim().to_lowercase();
        for (i, distractor) in output.distractors.iter().enumerate() {
            non_empty(&format!("distractors[{i}]"), distractor)?;
            if distractor.trim().to_lowercase() == back {
                return Err(SchemaViolation::new(
                    format!("distractors[{i}]"),
                    "must not equal the correct answer",
                ));
            }
        }

        Ok(())
    }
}

/// Deterministic assembly step: correct option is the card's back, option
/// ids are assigned after shuffling so the correct position varies.
/// Distractors beyond the available option ids are dropped.
pub fn assemble_with_rng<R: Rng + ?Sized>(
    input: &McqInput,
    mut distractors: Vec<String>,
    rng: &mut R,
) -> McqQuestion {
    distractors.truncate(OPTION_IDS.len() - 1);

    let mut texts: Vec<(String, bool)> = vec![(input.back.clone(), true)];
    texts.extend(distractors.into_iter().map(|d| (d, false)));
    texts.shuffle(rng);

    let mut correct_option_id = String::new();
    let options = texts
        .into_iter()
        .enumerate()
        .map(|(i, (text, is_correct))| {
            let id = OPTION_IDS[i].to_string();
            if is_correct {
                correct_option_id = id.clone();
            }
            McqOption { id, text }
        })
        .collect();

    McqQuestion {
        prompt: input.front.clone(),
        options,
        correct_option_id,
    }
}

/// Full conversion: generate distractors, then assemble and shuffle.
pub async fn convert_flashcard(
    provider: &dyn ModelProvider,
    input: McqInput,
) -> FlowResult<McqQuestion> {
    let set = McqFromFlashcardFlow.execute(provider, input.clone()).await?;
    Ok(assemble_with_rng(&input, set.distractors, &mut rand::thread_rng()))
}
