use crate::book::{BookSummary, Section};
use crate::llm::ResponseShape;
use serde_json::{Value, json};
use std::fmt::Write;

pub const SECTION_SYSTEM_PROMPT: &str = "You are a careful literary analyst. \
You read one section of a longer book at a time and describe it precisely. \
Answer only with JSON matching the requested schema.";

/// Fixed instructions appended to every section prompt.
pub const SECTION_INSTRUCTIONS: &str = "\
Analyze the section above and return:
- summary: a faithful summary of what happens, in 3-6 sentences
- writingStyle: the prose style (voice, sentence rhythm, point of view)
- tonality: the dominant emotional tone
- keyEvents: the plot-relevant events, in the order they occur
- qualityIssues: concrete problems an editor would flag (empty if none)";

pub const OVERVIEW_SYSTEM_PROMPT: &str = "You are a senior editor preparing a \
book-level analysis from per-section notes. Answer only with JSON matching \
the requested schema.";

pub fn build_section_prompt(section: &Section) -> String {
    format!(
        "Section title: {}\n\nSection content:\n{}\n\n{SECTION_INSTRUCTIONS}",
        section.title, section.content
    )
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

pub fn section_shape() -> ResponseShape {
    ResponseShape::new(
        "section_summary",
        json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string" },
                "writingStyle": { "type": "string" },
                "tonality": { "type": "string" },
                "keyEvents": string_list(),
                "qualityIssues": string_list(),
            },
            "required": ["summary", "writingStyle", "tonality", "keyEvents", "qualityIssues"],
            "additionalProperties": false,
        }),
    )
}

pub fn overview_shape() -> ResponseShape {
    ResponseShape::new(
        "book_overview",
        json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string" },
                "writingStyle": { "type": "string" },
                "quality": { "type": "string" },
                "keywords": string_list(),
                "genres": string_list(),
                "marketingCopy": { "type": "string" },
                "comparableAuthors": string_list(),
            },
            "required": [
                "summary", "writingStyle", "quality", "keywords",
                "genres", "marketingCopy", "comparableAuthors"
            ],
            "additionalProperties": false,
        }),
    )
}

/// Every section's notes, in book order, followed by the overview request.
pub fn build_overview_prompt(book: &BookSummary) -> String {
    let mut prompt = String::from("Per-section notes, in reading order:\n\n");
    for (index, section) in book.sections.iter().enumerate() {
        let _ = writeln!(prompt, "## {}. {}", index + 1, section.title);
        let _ = writeln!(prompt, "Summary: {}", section.summary);
        let _ = writeln!(prompt, "Tonality: {}", section.tonality);
        if !section.key_events.is_empty() {
            let _ = writeln!(prompt, "Key events: {}", section.key_events.join("; "));
        }
        if !section.quality_issues.is_empty() {
            let _ = writeln!(
                prompt,
                "Quality issues: {}",
                section.quality_issues.join("; ")
            );
        }
        prompt.push('\n');
    }
    prompt.push_str(
        "Write the book-level analysis: an overall summary, the writing style, \
an assessment of quality, keywords, genres, a short marketing blurb, and \
authors whose work is comparable.",
    );
    prompt
}
