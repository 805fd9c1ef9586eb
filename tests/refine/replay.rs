use std::sync::Arc;

use booklens::observability::NoopObserver;
use booklens::refine::{RefinementEngine, SummaryField, replay};

use crate::fakes::{ScriptedGenerator, sample_summary};

const SCRIPT: [(SummaryField, &str); 6] = [
    (SummaryField::Summary, r#"{"summary": "v1"}"#),
    (SummaryField::Keywords, r#"["tide", "lamp"]"#),
    (SummaryField::Summary, "v2 as bare prose"),
    (SummaryField::Genres, "```json\n{\"genres\": [\"gothic\"]}\n```"),
    (SummaryField::Summary, r#"{"summary": {"summary": "v3"}}"#),
    (SummaryField::Quality, "\"much improved\""),
];

async fn scripted_engine() -> RefinementEngine {
    let generator = ScriptedGenerator::new(SCRIPT.iter().map(|(_, reply)| *reply));
    let mut engine =
        RefinementEngine::with_summary(Arc::new(generator), Arc::new(NoopObserver), sample_summary());
    for (index, (field, _)) in SCRIPT.iter().enumerate() {
        engine
            .refine_section(*field, &format!("edit {index}"))
            .await
            .unwrap();
    }
    engine
}

#[tokio::test]
async fn every_repaired_reply_lands_in_its_field() {
    let engine = scripted_engine().await;
    let current = engine.current().unwrap();
    assert_eq!(current.summary, "v3");
    assert_eq!(current.keywords, vec!["tide".to_string(), "lamp".to_string()]);
    assert_eq!(current.genres, vec!["gothic".to_string()]);
    assert_eq!(current.quality.as_deref(), Some("much improved"));
    assert_eq!(engine.history().len(), SCRIPT.len());
}

#[tokio::test]
async fn revert_to_any_checkpoint_equals_replaying_its_prefix() {
    for k in 0..SCRIPT.len() {
        let mut engine = scripted_engine().await;
        let prefix = engine.history()[..=k].to_vec();
        let expected = replay(engine.initial().unwrap(), &prefix).unwrap();

        let checkpoint = prefix[k].timestamp;
        let reverted = engine.revert_to_timestamp(checkpoint).unwrap().clone();

        assert_eq!(reverted, expected, "checkpoint {k}");
        assert_eq!(engine.history(), prefix.as_slice());
    }
}

#[tokio::test]
async fn revert_keeps_multiply_touched_field_at_checkpoint_value() {
    let mut engine = scripted_engine().await;
    let third = engine.history()[2].timestamp;
    let doc = engine.revert_to_timestamp(third).unwrap();
    assert_eq!(doc.summary, "v2 as bare prose");
    assert_eq!(doc.genres, sample_summary().genres);
}

#[tokio::test]
async fn failed_refinement_does_not_touch_document_or_log() {
    let generator = Arc::new(ScriptedGenerator::new(["{\"summary\": \"v1\"}", "{ nope"]));
    let mut engine = RefinementEngine::with_summary(
        generator.clone(),
        Arc::new(NoopObserver),
        sample_summary(),
    );
    engine
        .refine_section(SummaryField::Summary, "first")
        .await
        .unwrap();
    let before = engine.current().cloned();

    assert!(
        engine
            .refine_section(SummaryField::Summary, "second")
            .await
            .is_err()
    );
    assert_eq!(engine.current().cloned(), before);
    assert_eq!(engine.history().len(), 1);
}
