//! Normalizes loosely-structured model output for one summary field.
//!
//! Text is tried against an ordered list of strategies (first parse wins),
//! then structurally unwrapped to a string, a string list, or an object.

use super::document::{FieldKind, FieldValue, SummaryField};
use crate::error::ParseError;
use serde_json::{Map, Value};

/// Parsed model output after structural repair.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairedValue {
    Text(String),
    List(Vec<String>),
    Object(Map<String, Value>),
}

/// One response as seen by the strategies.
pub struct RepairInput<'a> {
    pub raw: &'a str,
    /// Raw text with code fences removed and whitespace trimmed.
    pub cleaned: String,
    pub field: &'a str,
}

impl<'a> RepairInput<'a> {
    pub fn new(raw: &'a str, field: &'a str) -> Self {
        Self {
            raw,
            cleaned: strip_fences(raw),
            field,
        }
    }

    fn wrap(&self, value_text: &str) -> Option<Value> {
        let key = serde_json::to_string(self.field).ok()?;
        serde_json::from_str(&format!("{{{key}: {value_text}}}")).ok()
    }
}

pub type Strategy = fn(&RepairInput<'_>) -> Option<Value>;

/// Tried in order; the first `Some` wins.
pub const STRATEGIES: [(&str, Strategy); 5] = [
    ("direct", parse_direct),
    ("quoted_string", wrap_quoted_string),
    ("bare_text", wrap_bare_text),
    ("bare_array", wrap_bare_array),
    ("cleaned", parse_cleaned),
];

fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

pub fn parse_direct(input: &RepairInput<'_>) -> Option<Value> {
    serde_json::from_str(input.raw).ok()
}

pub fn wrap_quoted_string(input: &RepairInput<'_>) -> Option<Value> {
    let text = input.cleaned.as_str();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        input.wrap(text)
    } else {
        None
    }
}

pub fn wrap_bare_text(input: &RepairInput<'_>) -> Option<Value> {
    let text = input.cleaned.as_str();
    if text.starts_with('{') || text.starts_with('[') {
        return None;
    }
    let escaped = serde_json::to_string(text).ok()?;
    input.wrap(&escaped)
}

pub fn wrap_bare_array(input: &RepairInput<'_>) -> Option<Value> {
    let text = input.cleaned.as_str();
    if text.starts_with('[') && text.ends_with(']') {
        input.wrap(text)
    } else {
        None
    }
}

pub fn parse_cleaned(input: &RepairInput<'_>) -> Option<Value> {
    serde_json::from_str(&input.cleaned).ok()
}

/// Run the strategies in order and return the first parsed value.
pub fn parse_loose(raw: &str, field: &str) -> Result<Value, ParseError> {
    let input = RepairInput::new(raw, field);
    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(&input) {
            tracing::debug!(field, strategy = name, "repair.parsed");
            return Ok(value);
        }
    }
    Err(ParseError::Unrepairable {
        field: field.to_string(),
        message: format!(
            "no repair strategy produced valid JSON from {} chars",
            raw.len()
        ),
    })
}

/// Unwrap `{field: ...}` (at most twice), fall back to a lone key's value.
pub fn unwrap_field(value: Value, field: &str) -> RepairedValue {
    match value {
        Value::Object(mut map) => {
            if let Some(inner) = map.remove(field) {
                let inner = match inner {
                    Value::Object(mut nested) => match nested.remove(field) {
                        Some(value) => value,
                        None => Value::Object(nested),
                    },
                    other => other,
                };
                return RepairedValue::from(inner);
            }
            if map.len() == 1 {
                let only = map.into_iter().next().map_or(Value::Null, |(_, value)| value);
                return RepairedValue::from(only);
            }
            RepairedValue::Object(map)
        }
        other => RepairedValue::from(other),
    }
}

/// Full repair: ordered parse attempts, then structural unwrapping.
pub fn repair_response(raw: &str, field: &str) -> Result<RepairedValue, ParseError> {
    parse_loose(raw, field).map(|value| unwrap_field(value, field))
}

impl From<Value> for RepairedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            ),
            Value::Object(map) => Self::Object(map),
            Value::Null => Self::Text(String::new()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl RepairedValue {
    /// Coerce to the field's kind: lists join with newlines, text splits into
    /// lines with list markers removed, objects are rejected.
    pub fn into_field_value(self, field: SummaryField) -> Result<FieldValue, ParseError> {
        match (field.kind(), self) {
            (FieldKind::Text, Self::Text(text)) => Ok(FieldValue::Text(text)),
            (FieldKind::Text, Self::List(items)) => Ok(FieldValue::Text(items.join("\n"))),
            (FieldKind::List, Self::List(items)) => Ok(FieldValue::List(items)),
            (FieldKind::List, Self::Text(text)) => Ok(FieldValue::List(split_list_text(&text))),
            (kind, Self::Object(_)) => Err(ParseError::ShapeMismatch {
                field: field.to_string(),
                expected: kind.describe(),
            }),
        }
    }
}

fn split_list_text(text: &str) -> Vec<String> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(text.trim()) {
        return items;
    }
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim();
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0
        && let Some(rest) = line[digits..].strip_prefix(". ")
    {
        return rest.trim();
    }
    line
}
