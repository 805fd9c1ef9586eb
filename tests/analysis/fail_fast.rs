use std::sync::Arc;

use booklens::analysis::SummaryPipeline;
use booklens::error::{GenerationError, LensError};
use booklens::observability::ObserverEvent;

use crate::fakes::{JitterGenerator, RecordingObserver, numbered_sections};

#[tokio::test]
async fn one_failing_section_fails_the_book() {
    let sections = numbered_sections(12);
    let pipeline = SummaryPipeline::new(
        Arc::new(JitterGenerator::failing(&["Chapter 7"])),
        Arc::new(RecordingObserver::default()),
    )
    .with_concurrency(4);

    let err = pipeline.summarize(&sections).await.unwrap_err();
    match err {
        LensError::Section {
            index,
            title,
            source,
        } => {
            assert_eq!(index, 7);
            assert_eq!(title, "Chapter 7");
            assert!(matches!(source, GenerationError::Request { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn no_sections_are_admitted_after_a_failure() {
    let sections = numbered_sections(10);
    let generator = Arc::new(JitterGenerator::failing(&["Chapter 2"]));
    let pipeline = SummaryPipeline::new(
        generator.clone(),
        Arc::new(RecordingObserver::default()),
    )
    .with_concurrency(1);

    assert!(pipeline.summarize(&sections).await.is_err());
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn failure_is_reported_to_the_observer() {
    let observer = Arc::new(RecordingObserver::default());
    let pipeline = SummaryPipeline::new(
        Arc::new(JitterGenerator::failing(&["Chapter 0"])),
        observer.clone(),
    )
    .with_concurrency(1);

    assert!(pipeline.summarize(&numbered_sections(2)).await.is_err());
    let events = observer.snapshot();
    assert!(events.iter().any(|event| matches!(
        event,
        ObserverEvent::SectionFailed { index: 0, title, .. } if title == "Chapter 0"
    )));
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, ObserverEvent::PipelineFinished { .. }))
    );
}

#[tokio::test]
async fn success_emits_one_completion_per_section() {
    let observer = Arc::new(RecordingObserver::default());
    let pipeline = SummaryPipeline::new(Arc::new(JitterGenerator::new()), observer.clone());
    pipeline.summarize(&numbered_sections(5)).await.unwrap();

    let events = observer.snapshot();
    let completed = events
        .iter()
        .filter(|event| matches!(event, ObserverEvent::SectionCompleted { .. }))
        .count();
    assert_eq!(completed, 5);
    assert!(matches!(
        events.last(),
        Some(ObserverEvent::PipelineFinished { sections: 5, .. })
    ));
}
