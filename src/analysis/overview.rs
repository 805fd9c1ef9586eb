use super::moderation::aggregate_moderation;
use super::prompts::{OVERVIEW_SYSTEM_PROMPT, build_overview_prompt, overview_shape};
use crate::book::BookSummary;
use crate::error::Result;
use crate::llm::{TextGenerator, generate_typed};
use crate::observability::{Observer, ObserverEvent};
use crate::refine::ComprehensiveSummary;
use serde::Deserialize;
use std::time::Instant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewDraft {
    summary: String,
    writing_style: String,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    genres: Vec<String>,
    marketing_copy: String,
    #[serde(default)]
    comparable_authors: Vec<String>,
}

/// Build the book-level document from section summaries.
///
/// `flagged` and `moderationCategories` come from the aggregator, never from
/// the model.
pub async fn generate_overview(
    generator: &dyn TextGenerator,
    book: &BookSummary,
    observer: &dyn Observer,
) -> Result<ComprehensiveSummary> {
    let started = Instant::now();
    let prompt = build_overview_prompt(book);
    let shape = overview_shape();

    let draft: OverviewDraft =
        match generate_typed(generator, OVERVIEW_SYSTEM_PROMPT, &prompt, &shape).await {
            Ok(draft) => draft,
            Err(err) => {
                observer.record_event(&ObserverEvent::Error {
                    component: "overview".into(),
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };
    let verdict = aggregate_moderation(book);

    observer.record_event(&ObserverEvent::OverviewGenerated {
        duration: started.elapsed(),
    });
    Ok(ComprehensiveSummary {
        summary: draft.summary,
        writing_style: draft.writing_style,
        quality: draft.quality.filter(|q| !q.trim().is_empty()),
        keywords: draft.keywords,
        genres: draft.genres,
        marketing_copy: draft.marketing_copy,
        comparable_authors: draft.comparable_authors,
        flagged: verdict.flagged,
        moderation_categories: verdict.moderation_categories,
    })
}
