use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// One titled unit of the source document. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// The fixed moderation category set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
pub enum ModerationCategory {
    #[serde(rename = "sexual")]
    #[strum(serialize = "sexual")]
    Sexual,
    #[serde(rename = "sexual/minors")]
    #[strum(serialize = "sexual/minors")]
    SexualMinors,
    #[serde(rename = "harassment")]
    #[strum(serialize = "harassment")]
    Harassment,
    #[serde(rename = "harassment/threatening")]
    #[strum(serialize = "harassment/threatening")]
    HarassmentThreatening,
    #[serde(rename = "hate")]
    #[strum(serialize = "hate")]
    Hate,
    #[serde(rename = "hate/threatening")]
    #[strum(serialize = "hate/threatening")]
    HateThreatening,
    #[serde(rename = "illicit")]
    #[strum(serialize = "illicit")]
    Illicit,
    #[serde(rename = "illicit/violent")]
    #[strum(serialize = "illicit/violent")]
    IllicitViolent,
    #[serde(rename = "self-harm")]
    #[strum(serialize = "self-harm")]
    SelfHarm,
    #[serde(rename = "self-harm/intent")]
    #[strum(serialize = "self-harm/intent")]
    SelfHarmIntent,
    #[serde(rename = "self-harm/instructions")]
    #[strum(serialize = "self-harm/instructions")]
    SelfHarmInstructions,
    #[serde(rename = "violence")]
    #[strum(serialize = "violence")]
    Violence,
    #[serde(rename = "violence/graphic")]
    #[strum(serialize = "violence/graphic")]
    ViolenceGraphic,
}

impl ModerationCategory {
    /// Every category mapped to `false`.
    pub fn cleared_map() -> BTreeMap<ModerationCategory, bool> {
        Self::iter().map(|category| (category, false)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeMap<ModerationCategory, bool>,
    #[serde(default, alias = "category_scores")]
    pub scores: BTreeMap<ModerationCategory, f64>,
}

impl ModerationResult {
    pub fn is_set(&self, category: ModerationCategory) -> bool {
        self.categories.get(&category).copied().unwrap_or(false)
    }
}

/// Structured per-section analysis. `title` always mirrors the source section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub title: String,
    pub summary: String,
    pub writing_style: String,
    pub tonality: String,
    #[serde(default)]
    pub key_events: Vec<String>,
    #[serde(default)]
    pub quality_issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookSummary {
    pub sections: Vec<SectionSummary>,
}
