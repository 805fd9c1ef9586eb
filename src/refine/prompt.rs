use super::document::{ComprehensiveSummary, FieldKind, FieldValue, SummaryField};
use super::history::RefinementEntry;
use crate::llm::ResponseShape;
use serde_json::{Map, json};
use std::fmt::Write;

const SAME_FIELD_HISTORY: usize = 2;
const OTHER_FIELD_HISTORY: usize = 3;

pub const REFINE_SYSTEM_PROMPT: &str = "You are an editor revising one field of a book analysis. \
Apply the user's instruction to the current value only, stay consistent with the rest of the \
analysis, and answer with JSON containing that single field.";

/// The two most recent entries for `field` plus the three most recent for
/// other fields, oldest first.
pub fn relevant_history(history: &[RefinementEntry], field: SummaryField) -> Vec<&RefinementEntry> {
    let same = history
        .iter()
        .rev()
        .filter(|entry| entry.section == field)
        .take(SAME_FIELD_HISTORY);
    let other = history
        .iter()
        .rev()
        .filter(|entry| entry.section != field)
        .take(OTHER_FIELD_HISTORY);
    let mut merged: Vec<&RefinementEntry> = same.chain(other).collect();
    merged.sort_by_key(|entry| entry.timestamp);
    merged
}

pub fn field_shape(field: SummaryField) -> ResponseShape {
    let name = field.to_string();
    let value_schema = match field.kind() {
        FieldKind::Text => json!({"type": "string"}),
        FieldKind::List => json!({"type": "array", "items": {"type": "string"}}),
    };
    let mut properties = Map::new();
    properties.insert(name.clone(), value_schema);
    ResponseShape::new(
        format!("refine_{name}"),
        json!({
            "type": "object",
            "properties": properties,
            "required": [name],
            "additionalProperties": false,
        }),
    )
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn build_refine_prompt(
    field: SummaryField,
    instruction: &str,
    current: &ComprehensiveSummary,
    history: &[RefinementEntry],
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Field to revise: {field}");
    let _ = writeln!(prompt, "Expected type: {}\n", field.kind().describe());
    let _ = writeln!(prompt, "Current value:\n{}\n", render_value(&current.get(field)));

    let recent = relevant_history(history, field);
    if !recent.is_empty() {
        prompt.push_str("Recent revisions (oldest first):\n");
        for entry in recent {
            let _ = writeln!(
                prompt,
                "- [{}] {}: \"{}\"",
                entry.timestamp, entry.section, entry.instruction
            );
        }
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "Instruction:\n{instruction}\n");

    let context = serde_json::to_string_pretty(current).unwrap_or_default();
    let _ = writeln!(prompt, "Full analysis for context:\n{context}\n");
    let _ = write!(
        prompt,
        "Respond with a JSON object whose only key is \"{field}\"."
    );
    prompt
}
