use std::sync::Arc;
use std::sync::atomic::Ordering;

use booklens::analysis::{SummaryPipeline, aggregate_moderation};
use booklens::book::{ModerationCategory, Section};
use booklens::error::{GenerationError, LensError};
use booklens::llm::Moderator;
use booklens::observability::NoopObserver;

use crate::fakes::{FailingModerator, JitterGenerator, KeywordModerator, numbered_sections};

#[tokio::test]
async fn moderation_is_attached_per_section_and_aggregated() {
    let sections = vec![
        Section::new("Calm", "A quiet morning."),
        Section::new("Storm", "Words of hate at the harbour."),
    ];
    let moderator = Arc::new(KeywordModerator::new());
    let pipeline = SummaryPipeline::new(Arc::new(JitterGenerator::new()), Arc::new(NoopObserver))
        .with_moderator(Some(moderator.clone() as Arc<dyn Moderator>));

    let book = pipeline.summarize(&sections).await.unwrap();
    assert_eq!(moderator.calls.load(Ordering::SeqCst), 2);
    assert!(!book.sections[0].moderation.as_ref().unwrap().flagged);
    assert!(book.sections[1].moderation.as_ref().unwrap().flagged);

    let verdict = aggregate_moderation(&book);
    assert!(verdict.flagged);
    assert!(verdict.moderation_categories[&ModerationCategory::Hate]);
    assert!(!verdict.moderation_categories[&ModerationCategory::Sexual]);
}

#[tokio::test]
async fn disabled_moderation_leaves_results_absent() {
    let pipeline = SummaryPipeline::new(Arc::new(JitterGenerator::new()), Arc::new(NoopObserver))
        .with_moderator(None);
    let book = pipeline.summarize(&numbered_sections(4)).await.unwrap();
    assert!(book.sections.iter().all(|s| s.moderation.is_none()));

    let verdict = aggregate_moderation(&book);
    assert!(!verdict.flagged);
    assert!(verdict.moderation_categories.values().all(|set| !set));
}

#[tokio::test]
async fn moderation_failure_fails_the_section_and_the_book() {
    let sections = vec![Section::new("Only", "text")];
    let pipeline = SummaryPipeline::new(Arc::new(JitterGenerator::new()), Arc::new(NoopObserver))
        .with_moderator(Some(Arc::new(FailingModerator) as Arc<dyn Moderator>));

    let err = pipeline.summarize(&sections).await.unwrap_err();
    match err {
        LensError::Section {
            index,
            title,
            source,
        } => {
            assert_eq!(index, 0);
            assert_eq!(title, "Only");
            assert!(matches!(source, GenerationError::Moderation(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
