use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use studyhall_core::SchemaViolation;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModifyScope {
    Block,
    Page,
    Assignment,
}

impl ModifyScope {
    fn as_str(&self) -> &'static str {
        match self {
            ModifyScope::Block => "content block",
            ModifyScope::Page => "page",
            ModifyScope::Assignment => "assignment",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModifyInput {
    /// Free-text description of the requested change.
    #[validate(length(min = 1))]
    pub request: String,
    pub scope: ModifyScope,
    /// The data blob to modify; its structural shape must be preserved.
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyOutput {
    pub modified_data: Value,
    pub success: bool,
    pub message: String,
}

pub struct ContentModifyFlow;

impl GenerationFlow for ContentModifyFlow {
    type Input = ModifyInput;
    type Output = ModifyOutput;

    fn name(&self) -> &'static str {
        "content_modification"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You edit structured course content in place, never changing its shape. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        let data = serde_json::to_string_pretty(&input.data).unwrap_or_default();
        format!(
            "Apply the following change to the {scope} data below.\n\n\
             Requested change: {request}\n\n\
             Current {scope} data:\n{data}\n\n\
             Return the modified data with exactly the same structure: same value types \
             and, for objects, the same keys. Only change the parts the request asks for. \
             If the request cannot be applied, return the data unchanged, set success to \
             false and explain why in the message.",
            scope = input.scope.as_str(),
            request = input.request,
            data = data,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "modified_data": {},
                "success": {"type": "boolean"},
                "message": {"type": "string"},
            },
            "required": ["modified_data", "success", "message"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        non_empty("message", &output.message)?;
        check_shape_preserved(&input.data, &output.modified_data)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The flow modifies data, it does not replace it wholesale: the modified
/// value must keep the original's JSON kind, and objects must keep their
/// key set.
fn check_shape_preserved(original: &Value, modified: &Value) -> Result<(), SchemaViolation> {
    if value_kind(original) != value_kind(modified) {
        return Err(SchemaViolation::new(
            "modified_data",
            format!(
                "expected {} to match the input shape, got {}",
                value_kind(original),
                value_kind(modified)
            ),
        ));
    }

    if let (Value::Object(before), Value::Object(after)) = (original, modified) {
        for key in before.keys() {
            if !after.contains_key(key) {
                return Err(SchemaViolation::new(
                    "modified_data",
                    format!("missing key `{key}` from the input shape"),
                ));
            }
        }
        for key in after.keys() {
            if !before.contains_key(key) {
                return Err(SchemaViolation::new(
                    "modified_data",
                    format!("unexpected key `{key}` not present in the input shape"),
                ));
            }
        }
    }

    Ok(())
}
