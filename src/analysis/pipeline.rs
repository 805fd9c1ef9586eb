//! Bounded fan-out of book sections to the text generation port.

use super::prompts::{SECTION_SYSTEM_PROMPT, build_section_prompt, section_shape};
pub use crate::config::DEFAULT_CONCURRENCY;
use crate::book::{BookSummary, ModerationResult, Section, SectionSummary};
use crate::error::{GenerationError, LensError, Result};
use crate::llm::{Moderator, TextGenerator, generate_typed};
use crate::observability::{Observer, ObserverEvent};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Generated part of a section summary; the title is never taken from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionDraft {
    summary: String,
    writing_style: String,
    tonality: String,
    #[serde(default)]
    key_events: Vec<String>,
    #[serde(default)]
    quality_issues: Vec<String>,
}

type TaskOutcome = (usize, Option<std::result::Result<SectionSummary, GenerationError>>);

pub struct SummaryPipeline {
    generator: Arc<dyn TextGenerator>,
    moderator: Option<Arc<dyn Moderator>>,
    observer: Arc<dyn Observer>,
    concurrency: usize,
}

impl SummaryPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, observer: Arc<dyn Observer>) -> Self {
        Self {
            generator,
            moderator: None,
            observer,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_moderator(mut self, moderator: Option<Arc<dyn Moderator>>) -> Self {
        self.moderator = moderator;
        self
    }

    /// At most `limit` sections in flight; zero is treated as one.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Summarize every section, returning results in input order.
    ///
    /// The first failing section aborts the run: no further sections are
    /// admitted, tasks already running are detached and their results dropped.
    pub async fn summarize(&self, sections: &[Section]) -> Result<BookSummary> {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let cancel = CancellationToken::new();
        let mut join_set: JoinSet<TaskOutcome> = JoinSet::new();
        let mut slots: Vec<Option<SectionSummary>> = vec![None; sections.len()];

        for (index, section) in sections.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let generator = Arc::clone(&self.generator);
            let moderator = self.moderator.clone();
            let observer = Arc::clone(&self.observer);
            let cancel = cancel.clone();
            let section = section.clone();

            join_set.spawn(async move {
                let _permit = permit;
                if cancel.is_cancelled() {
                    return (index, None);
                }
                observer.record_event(&ObserverEvent::SectionStarted {
                    index,
                    title: section.title.clone(),
                });

                let section_started = Instant::now();
                let outcome =
                    summarize_section(generator.as_ref(), moderator.as_deref(), &section).await;
                match &outcome {
                    Ok(summary) => observer.record_event(&ObserverEvent::SectionCompleted {
                        index,
                        duration: section_started.elapsed(),
                        flagged: summary.moderation.as_ref().is_some_and(|m| m.flagged),
                    }),
                    Err(err) => {
                        cancel.cancel();
                        observer.record_event(&ObserverEvent::SectionFailed {
                            index,
                            title: section.title.clone(),
                            message: err.to_string(),
                        });
                    }
                }
                (index, Some(outcome))
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let (index, outcome) = match joined {
                Ok(done) => done,
                Err(join_err) => {
                    join_set.detach_all();
                    return Err(LensError::Other(anyhow::anyhow!(
                        "section task aborted: {join_err}"
                    )));
                }
            };
            match outcome {
                Some(Ok(summary)) => slots[index] = Some(summary),
                Some(Err(source)) => {
                    join_set.detach_all();
                    return Err(LensError::Section {
                        index,
                        title: sections[index].title.clone(),
                        source,
                    });
                }
                None => {}
            }
        }

        let summaries: Option<Vec<SectionSummary>> = slots.into_iter().collect();
        let Some(summaries) = summaries else {
            return Err(LensError::Other(anyhow::anyhow!(
                "pipeline finished with unfilled section slots"
            )));
        };

        self.observer.record_event(&ObserverEvent::PipelineFinished {
            sections: summaries.len(),
            duration: started.elapsed(),
        });
        Ok(BookSummary {
            sections: summaries,
        })
    }
}

/// Generation and moderation for one section, issued concurrently.
async fn summarize_section(
    generator: &dyn TextGenerator,
    moderator: Option<&dyn Moderator>,
    section: &Section,
) -> std::result::Result<SectionSummary, GenerationError> {
    let prompt = build_section_prompt(section);
    let shape = section_shape();
    let moderation_text = format!("{}\n\n{}", section.title, section.content);

    let generation =
        generate_typed::<SectionDraft>(generator, SECTION_SYSTEM_PROMPT, &prompt, &shape);
    let moderation = async {
        match moderator {
            Some(moderator) => moderator.classify(&moderation_text).await.map(Some),
            None => Ok::<Option<ModerationResult>, GenerationError>(None),
        }
    };

    let (draft, moderation) = tokio::join!(generation, moderation);
    let draft = draft?;
    Ok(SectionSummary {
        title: section.title.clone(),
        summary: draft.summary,
        writing_style: draft.writing_style,
        tonality: draft.tonality,
        key_events: draft.key_events,
        quality_issues: draft.quality_issues,
        moderation: moderation?,
    })
}
