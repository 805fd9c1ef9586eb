use std::sync::Arc;

use booklens::analysis::SummaryPipeline;
use booklens::observability::NoopObserver;

use crate::fakes::{JitterGenerator, numbered_sections};

#[tokio::test]
async fn results_follow_input_order_for_every_limit() {
    let sections = numbered_sections(24);
    for limit in [1, 2, 5, 24, 75] {
        let generator = Arc::new(JitterGenerator::new());
        let pipeline = SummaryPipeline::new(generator.clone(), Arc::new(NoopObserver))
            .with_concurrency(limit);

        let book = pipeline.summarize(&sections).await.unwrap();

        assert_eq!(book.sections.len(), sections.len(), "limit {limit}");
        for (input, output) in sections.iter().zip(&book.sections) {
            assert_eq!(output.title, input.title, "limit {limit}");
            assert_eq!(output.summary, format!("summary of {}", input.title));
        }
        assert!(generator.peak() <= limit, "limit {limit} exceeded");
    }
}

#[tokio::test]
async fn model_title_never_replaces_section_title() {
    let sections = numbered_sections(3);
    let pipeline = SummaryPipeline::new(Arc::new(JitterGenerator::new()), Arc::new(NoopObserver));
    let book = pipeline.summarize(&sections).await.unwrap();
    assert!(
        book.sections
            .iter()
            .all(|s| s.title != "model-chosen title")
    );
}

#[tokio::test]
async fn sections_run_concurrently_up_to_the_limit() {
    let sections = numbered_sections(40);
    let generator = Arc::new(JitterGenerator::new());
    let pipeline =
        SummaryPipeline::new(generator.clone(), Arc::new(NoopObserver)).with_concurrency(8);
    pipeline.summarize(&sections).await.unwrap();
    assert!(generator.peak() > 1);
    assert!(generator.peak() <= 8);
    assert_eq!(generator.calls(), 40);
}
