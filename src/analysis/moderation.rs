//! Folds per-section moderation results into one book-level verdict.

use crate::book::{BookSummary, ModerationCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    pub flagged: bool,
    pub moderation_categories: BTreeMap<ModerationCategory, bool>,
}

/// OR of every present result; sections without moderation contribute nothing.
pub fn aggregate_moderation(book: &BookSummary) -> ModerationVerdict {
    let mut flagged = false;
    let mut categories = ModerationCategory::cleared_map();

    for result in book.sections.iter().filter_map(|s| s.moderation.as_ref()) {
        flagged |= result.flagged;
        for category in ModerationCategory::iter() {
            if result.is_set(category) {
                categories.insert(category, true);
            }
        }
    }

    ModerationVerdict {
        flagged,
        moderation_categories: categories,
    }
}
