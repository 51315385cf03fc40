//! Sequential question answering.
//!
//! Every question is sent to the provider one at a time, in catalog order.
//! A failed call never aborts the run: its error message becomes the answer
//! and the next question is asked.

use crate::agent::provider::AnswerProvider;
use crate::models::{AnsweredQuestion, AnsweredSection, Section};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Ask every question of every section and collect the answers.
pub async fn collect_answers(
    provider: &dyn AnswerProvider,
    sections: &[Section],
    context: Option<&str>,
    show_progress: bool,
) -> Vec<AnsweredSection> {
    let total: usize = sections.iter().map(|s| s.entries.len()).sum();
    let progress = if show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut answered_sections = Vec::with_capacity(sections.len());

    for section in sections {
        info!("Section: {}", section.title);
        let mut answers = Vec::with_capacity(section.entries.len());

        for entry in &section.entries {
            if let Some(pb) = &progress {
                pb.set_message(format!("{} #{}", section.title, entry.index));
            }

            let (answer, failed) = match provider.answer(&entry.question, context).await {
                Ok(answer) => (answer, false),
                Err(e) => {
                    warn!("Question {} of '{}' failed: {}", entry.index, section.title, e);
                    (e.to_string(), true)
                }
            };

            answers.push(AnsweredQuestion {
                entry: entry.clone(),
                answer,
                failed,
            });

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        answered_sections.push(AnsweredSection {
            kind: section.kind,
            title: section.title.clone(),
            answers,
        });
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    answered_sections
}
