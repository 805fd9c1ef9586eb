use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result};
use booklens::analysis::{SummaryPipeline, generate_overview};
use booklens::book::load_sections;
use booklens::config::Config;
use booklens::error::GenerationError;
use booklens::llm::{
    GenerationFuture, ResponseShape, TextGenerator, create_generator, create_moderator,
};
use booklens::observability::{Observer, create_observer};
use booklens::refine::{
    ComprehensiveSummary, FieldValue, RefinementEngine, SummaryField, load_history, save_history,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Stand-in generator for commands that never call the model.
struct Unavailable;

impl TextGenerator for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn generate<'a>(
        &'a self,
        _system_prompt: &'a str,
        _prompt: &'a str,
        _shape: &'a ResponseShape,
    ) -> GenerationFuture<'a, String> {
        Box::pin(async {
            Err(GenerationError::MissingApiKey {
                provider: "unavailable".into(),
            })
        })
    }
}

fn history_path(config: &Config, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| config.history_path())
}

/// Engine restored from the history file.
fn restore_engine(
    path: &Path,
    generator: Arc<dyn TextGenerator>,
    observer: Arc<dyn Observer>,
) -> Result<RefinementEngine> {
    let snapshot = load_history(path)?;
    let mut engine = RefinementEngine::new(generator, observer);
    engine.import_history(snapshot)?;
    Ok(engine)
}

fn persist(engine: &RefinementEngine, path: &Path) -> Result<()> {
    let snapshot = engine.export_history()?;
    save_history(path, &snapshot)?;
    info!(path = %path.display(), entries = snapshot.history.len(), "history.saved");
    Ok(())
}

fn print_summary(summary: &ComprehensiveSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to render summary")?;
    println!("{json}");
    Ok(())
}

fn print_field(field: SummaryField, summary: &ComprehensiveSummary) {
    println!("{field}:");
    match summary.get(field) {
        FieldValue::Text(text) => println!("{text}"),
        FieldValue::List(items) => {
            for item in items {
                println!("  - {item}");
            }
        }
    }
}

async fn run_summarize(
    config: &Config,
    observer: Arc<dyn Observer>,
    book: &Path,
    out: PathBuf,
    concurrency: Option<usize>,
    no_moderation: bool,
) -> Result<()> {
    let sections = load_sections(book).await?;
    info!(book = %book.display(), sections = sections.len(), "book.loaded");

    let generator = create_generator(config)?;
    let moderator = if no_moderation {
        None
    } else {
        create_moderator(config)?
    };

    let pipeline = SummaryPipeline::new(Arc::clone(&generator), Arc::clone(&observer))
        .with_moderator(moderator)
        .with_concurrency(concurrency.unwrap_or(config.pipeline.concurrency));
    let book_summary = pipeline.summarize(&sections).await?;
    let overview = generate_overview(generator.as_ref(), &book_summary, observer.as_ref()).await?;

    let engine = RefinementEngine::with_summary(generator, observer, overview);
    persist(&engine, &out)?;
    if let Some(current) = engine.current() {
        print_summary(current)?;
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let observer = create_observer(&config.observability);
    dispatch_with(cli.command, &config, observer).await
}

/// Run one command, flushing the observer whether it succeeds or not.
async fn dispatch_with(
    command: Commands,
    config: &Config,
    observer: Arc<dyn Observer>,
) -> Result<()> {
    let outcome = run_command(command, config, Arc::clone(&observer)).await;
    observer.flush();
    outcome
}

async fn run_command(
    command: Commands,
    config: &Config,
    observer: Arc<dyn Observer>,
) -> Result<()> {
    let offline: Arc<dyn TextGenerator> = Arc::new(Unavailable);

    match command {
        Commands::Summarize {
            book,
            out,
            concurrency,
            no_moderation,
        } => {
            let out = history_path(config, out);
            run_summarize(
                config,
                Arc::clone(&observer),
                &book,
                out,
                concurrency,
                no_moderation,
            )
            .await
        }

        Commands::Refine {
            field,
            instruction,
            history,
        } => {
            let path = history_path(config, history);
            let generator = create_generator(config)?;
            let mut engine = restore_engine(&path, generator, Arc::clone(&observer))?;
            let updated = engine.refine_section(field, &instruction).await?.clone();
            persist(&engine, &path)?;
            print_field(field, &updated);
            Ok(())
        }

        Commands::Undo { history } => {
            let path = history_path(config, history);
            let mut engine = restore_engine(&path, offline, Arc::clone(&observer))?;
            engine.revert_last_change()?;
            persist(&engine, &path)?;
            println!("Reverted last change ({} left).", engine.history().len());
            Ok(())
        }

        Commands::Revert { timestamp, history } => {
            let path = history_path(config, history);
            let mut engine = restore_engine(&path, offline, Arc::clone(&observer))?;
            engine.revert_to_timestamp(timestamp)?;
            persist(&engine, &path)?;
            println!(
                "Reverted to {timestamp} ({} entries kept).",
                engine.history().len()
            );
            Ok(())
        }

        Commands::Reset { history } => {
            let path = history_path(config, history);
            let mut engine = restore_engine(&path, offline, Arc::clone(&observer))?;
            engine.reset();
            persist(&engine, &path)?;
            println!("History cleared.");
            Ok(())
        }

        Commands::History { history } => {
            let path = history_path(config, history);
            let snapshot = load_history(&path)?;
            if snapshot.history.is_empty() {
                println!("No refinements yet.");
            }
            for entry in &snapshot.history {
                println!("{}  {:<18} {}", entry.timestamp, entry.section, entry.instruction);
            }
            Ok(())
        }

        Commands::Show { history } => {
            let path = history_path(config, history);
            let snapshot = load_history(&path)?;
            print_summary(&snapshot.current_summary)
        }
    }
}
