use std::sync::Arc;

use booklens::analysis::{SummaryPipeline, generate_overview};
use booklens::book::{ModerationCategory, Section};
use booklens::llm::Moderator;
use booklens::observability::{NoopObserver, ObserverEvent};

use crate::fakes::{JitterGenerator, KeywordModerator, RecordingObserver, ScriptedGenerator};

const OVERVIEW_REPLY: &str = r#"```json
{"summary":"Whole book","writingStyle":"spare","quality":"solid","keywords":["sea"],"genres":["literary"],"marketingCopy":"Read it.","comparableAuthors":["Fosse"]}
```"#;

#[tokio::test]
async fn overview_combines_generation_with_aggregated_moderation() {
    let sections = vec![
        Section::new("One", "hate speech appears"),
        Section::new("Two", "calm water"),
    ];
    let book = SummaryPipeline::new(Arc::new(JitterGenerator::new()), Arc::new(NoopObserver))
        .with_moderator(Some(Arc::new(KeywordModerator::new()) as Arc<dyn Moderator>))
        .summarize(&sections)
        .await
        .unwrap();

    let generator = ScriptedGenerator::new([OVERVIEW_REPLY]);
    let observer = RecordingObserver::default();
    let overview = generate_overview(&generator, &book, &observer)
        .await
        .unwrap();

    assert_eq!(overview.summary, "Whole book");
    assert_eq!(overview.comparable_authors, vec!["Fosse".to_string()]);
    assert!(overview.flagged);
    assert!(overview.moderation_categories[&ModerationCategory::Hate]);

    let prompt = generator.prompts.lock().unwrap()[0].clone();
    assert!(prompt.find("One").unwrap() < prompt.find("Two").unwrap());
    assert!(matches!(
        observer.snapshot().as_slice(),
        [ObserverEvent::OverviewGenerated { .. }]
    ));
}
