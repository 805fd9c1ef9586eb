use crate::book::ModerationCategory;
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};

/// Editable fields of a [`ComprehensiveSummary`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SummaryField {
    Summary,
    WritingStyle,
    Quality,
    Keywords,
    Genres,
    MarketingCopy,
    ComparableAuthors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::List => "list of strings",
        }
    }
}

impl SummaryField {
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Summary | Self::WritingStyle | Self::Quality | Self::MarketingCopy => {
                FieldKind::Text
            }
            Self::Keywords | Self::Genres | Self::ComparableAuthors => FieldKind::List,
        }
    }
}

/// A field's value: a single string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::List(_) => FieldKind::List,
        }
    }
}

/// Book-level analysis document.
///
/// `flagged` and `moderation_categories` come from the moderation aggregate,
/// never from the generation service, and are not editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveSummary {
    pub summary: String,
    pub writing_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub marketing_copy: String,
    #[serde(default)]
    pub comparable_authors: Vec<String>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default = "ModerationCategory::cleared_map")]
    pub moderation_categories: BTreeMap<ModerationCategory, bool>,
}

impl ComprehensiveSummary {
    pub fn get(&self, field: SummaryField) -> FieldValue {
        match field {
            SummaryField::Summary => FieldValue::Text(self.summary.clone()),
            SummaryField::WritingStyle => FieldValue::Text(self.writing_style.clone()),
            SummaryField::Quality => FieldValue::Text(self.quality.clone().unwrap_or_default()),
            SummaryField::Keywords => FieldValue::List(self.keywords.clone()),
            SummaryField::Genres => FieldValue::List(self.genres.clone()),
            SummaryField::MarketingCopy => FieldValue::Text(self.marketing_copy.clone()),
            SummaryField::ComparableAuthors => FieldValue::List(self.comparable_authors.clone()),
        }
    }

    /// Fails without writing when the value's kind does not match the field.
    pub fn set(&mut self, field: SummaryField, value: FieldValue) -> Result<(), ParseError> {
        match (field, value) {
            (SummaryField::Summary, FieldValue::Text(text)) => self.summary = text,
            (SummaryField::WritingStyle, FieldValue::Text(text)) => self.writing_style = text,
            (SummaryField::Quality, FieldValue::Text(text)) => {
                self.quality = Some(text).filter(|q| !q.trim().is_empty());
            }
            (SummaryField::MarketingCopy, FieldValue::Text(text)) => self.marketing_copy = text,
            (SummaryField::Keywords, FieldValue::List(items)) => self.keywords = items,
            (SummaryField::Genres, FieldValue::List(items)) => self.genres = items,
            (SummaryField::ComparableAuthors, FieldValue::List(items)) => {
                self.comparable_authors = items;
            }
            (field, _) => {
                return Err(ParseError::ShapeMismatch {
                    field: field.to_string(),
                    expected: field.kind().describe(),
                });
            }
        }
        Ok(())
    }
}
