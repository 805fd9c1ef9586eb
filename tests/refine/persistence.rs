use std::sync::Arc;

use tempfile::TempDir;

use booklens::error::{HistoryImportError, LensError};
use booklens::observability::NoopObserver;
use booklens::refine::{
    ExportedHistory, HISTORY_VERSION, RefinementEngine, SummaryField, load_history, save_history,
};

use crate::fakes::{ScriptedGenerator, sample_summary};

async fn refined_engine() -> RefinementEngine {
    let generator = Arc::new(ScriptedGenerator::new([
        r#"{"summary": "tighter"}"#,
        "- storm\n- lamp",
    ]));
    let mut engine =
        RefinementEngine::with_summary(generator, Arc::new(NoopObserver), sample_summary());
    engine
        .refine_section(SummaryField::Summary, "tighten")
        .await
        .unwrap();
    engine
        .refine_section(SummaryField::Keywords, "stormier")
        .await
        .unwrap();
    engine
}

fn empty_engine() -> RefinementEngine {
    RefinementEngine::new(
        Arc::new(ScriptedGenerator::new(Vec::<String>::new())),
        Arc::new(NoopObserver),
    )
}

#[tokio::test]
async fn import_of_export_is_a_no_op() {
    let mut engine = refined_engine().await;
    let current = engine.current().cloned();
    let history = engine.history().to_vec();

    let snapshot = engine.export_history().unwrap();
    assert_eq!(snapshot.version, HISTORY_VERSION);
    engine.import_history(snapshot).unwrap();

    assert_eq!(engine.current().cloned(), current);
    assert_eq!(engine.history(), history.as_slice());
}

#[tokio::test]
async fn history_survives_a_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("history.json");
    let engine = refined_engine().await;
    save_history(&path, &engine.export_history().unwrap()).unwrap();

    let loaded = load_history(&path).unwrap();
    let mut restored = empty_engine();
    restored.import_history(loaded).unwrap();

    assert_eq!(restored.current(), engine.current());
    assert_eq!(restored.initial(), engine.initial());
    assert_eq!(restored.history(), engine.history());
    assert_eq!(
        restored.current().unwrap().keywords,
        vec!["storm".to_string(), "lamp".to_string()]
    );
}

#[tokio::test]
async fn reset_after_foreign_import_yields_foreign_initial() {
    let foreign = refined_engine().await.export_history().unwrap();
    let mut engine = RefinementEngine::with_summary(
        Arc::new(ScriptedGenerator::new(Vec::<String>::new())),
        Arc::new(NoopObserver),
        {
            let mut other = sample_summary();
            other.summary = "someone else's book".into();
            other
        },
    );
    engine.import_history(foreign.clone()).unwrap();

    assert_eq!(engine.reset(), Some(&foreign.initial_summary));
    assert!(engine.history().is_empty());
}

#[tokio::test]
async fn import_rejects_missing_fields_and_versions() {
    let json = refined_engine()
        .await
        .export_history()
        .unwrap()
        .to_json()
        .unwrap();
    let mut engine = empty_engine();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value.as_object_mut().unwrap().remove("currentSummary");
    assert!(matches!(
        engine.import_history_json(&value.to_string()),
        Err(LensError::Import(HistoryImportError::MissingField(
            "currentSummary"
        )))
    ));

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["version"] = "0.9".into();
    assert!(matches!(
        engine.import_history_json(&value.to_string()),
        Err(LensError::Import(HistoryImportError::VersionMismatch { .. }))
    ));
    assert!(engine.current().is_none());
}

#[tokio::test]
async fn import_rejects_out_of_order_timestamps() {
    let mut snapshot: ExportedHistory = refined_engine().await.export_history().unwrap();
    snapshot.history.swap(0, 1);
    let mut engine = empty_engine();
    assert!(matches!(
        engine.import_history(snapshot),
        Err(LensError::Import(HistoryImportError::NonMonotonicTimestamps))
    ));
}
