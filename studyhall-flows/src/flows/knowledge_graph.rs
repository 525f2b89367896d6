use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;
use studyhall_core::SchemaViolation;
use validator::Validate;

use crate::flow::{non_empty, GenerationFlow};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KnowledgeGraphInput {
    #[validate(length(min = 1))]
    pub source_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeGraphOutput {
    pub nodes: Vec<KgNode>,
    pub edges: Vec<KgEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgEdge {
    pub from: String,
    pub to: String,
    pub relation: String,
}

pub struct KnowledgeGraphFlow;

impl GenerationFlow for KnowledgeGraphFlow {
    type Input = KnowledgeGraphInput;
    type Output = KnowledgeGraphOutput;

    fn name(&self) -> &'static str {
        "knowledge_graph"
    }

    fn system_prompt(&self) -> Option<&'static str> {
        Some("You extract concept graphs from study material. Reply with JSON only.")
    }

    fn render_prompt(&self, input: &Self::Input) -> String {
        format!(
            "Extract the key concepts from the study material below as a knowledge graph. \
             Each node has a short unique id and a human-readable label. Each edge connects \
             two node ids with a short relation phrase (e.g. \"is part of\", \"causes\"). \
             Every edge must reference node ids that appear in the node list.\n\n\
             Study material:\n{source}",
            source = input.source_text,
        )
    }

    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "nodes": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "label": {"type": "string"},
                        },
                        "required": ["id", "label"],
                    },
                },
                "edges": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "from": {"type": "string"},
                            "to": {"type": "string"},
                            "relation": {"type": "string"},
                        },
                        "required": ["from", "to", "relation"],
                    },
                },
            },
            "required": ["nodes", "edges"],
        })
    }

    fn validate_output(
        &self,
        output: &Self::Output,
        _input: &Self::Input,
    ) -> Result<(), SchemaViolation> {
        if output.nodes.is_empty() {
            return Err(SchemaViolation::new("nodes", "must not be empty"));
        }

        let mut ids = HashSet::new();
        for (i, node) in output.nodes.iter().enumerate() {
            non_empty(&format!("nodes[{i}].id"), &node.id)?;
            non_empty(&format!("nodes[{i}].label"), &node.label)?;
            if !ids.insert(node.id.as_str()) {
                return Err(SchemaViolation::new(
                    format!("nodes[{i}].id"),
                    format!("duplicate node id `{}`", node.id),
                ));
            }
        }

        for (i, edge) in output.edges.iter().enumerate() {
            non_empty(&format!("edges[{i}].relation"), &edge.relation)?;
            for (end, id) in [("from", &edge.from), ("to", &edge.to)] {
                if !ids.contains(id.as_str()) {
                    return Err(SchemaViolation::new(
                        format!("edges[{i}].{end}"),
                        format!("references unknown node id `{id}`"),
                    ));
                }
            }
        }

        Ok(())
    }
}
