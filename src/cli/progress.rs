use indicatif::{ProgressBar, ProgressStyle};
use console::style;
use crate::pipeline::{ChainEvent, StageOutcome};

/// Renders chain events: stage banners on stdout and a progress bar while a
/// token is being extracted.
pub struct ChainProgress {
    extraction_bar: Option<ProgressBar>,
}

impl ChainProgress {
    pub fn new() -> Self {
        Self { extraction_bar: None }
    }

    pub fn handle_event(&mut self, event: &ChainEvent) {
        match event {
            ChainEvent::ChainStarted { run_id, target, chain } => {
                println!(
                    "{} Starting exploit chain {} against {} (run {})",
                    style("[+]").green().bold(),
                    style(chain).cyan(),
                    style(target).white().bold(),
                    style(run_id).dim(),
                );
            }
            ChainEvent::StageStarted { step, display_name, .. } => {
                println!("{}", stage_banner(*step, display_name));
            }
            ChainEvent::StageFinished { stage, outcome } => {
                let line = match outcome {
                    StageOutcome::Succeeded => format!("{} {} succeeded", style("[+]").green(), stage),
                    StageOutcome::Skipped => format!("{} {} skipped", style("[*]").dim(), stage),
                    StageOutcome::Failed(reason) => format!(
                        "{} {} failed: {}",
                        style("[-]").red(),
                        stage,
                        style(reason).red().dim()
                    ),
                };
                println!("{}", line);
            }
            ChainEvent::ExtractionStarted { total } => {
                let bar = ProgressBar::new(*total as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("  {bar:32.cyan/dark_gray} {pos}/{len} chars {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("█▓░"),
                );
                bar.set_message("dumping token");
                self.extraction_bar = Some(bar);
            }
            ChainEvent::CharacterResolved { position, .. } => {
                if let Some(bar) = &self.extraction_bar {
                    bar.set_position(*position as u64);
                }
            }
            ChainEvent::ExtractionFinished { success } => {
                if let Some(bar) = self.extraction_bar.take() {
                    if *success {
                        bar.finish_with_message("done");
                    } else {
                        bar.abandon_with_message("failed");
                    }
                }
            }
            ChainEvent::ChainFinished { result } => {
                let summary = if result.succeeded() {
                    style("Chain completed, every stage succeeded").green().bold()
                } else if result.completed() {
                    style("Chain completed with failed stages").yellow().bold()
                } else {
                    style("Chain aborted").red().bold()
                };
                println!("\n{}", summary);
            }
        }
    }
}

impl Default for ChainProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// `Step N - Name` underlined with `-=` to the same width.
pub fn stage_banner(step: usize, display_name: &str) -> String {
    let title = format!("Step {} - {}", step, display_name);
    let underline: String = "-=".chars().cycle().take(title.chars().count()).collect();
    format!("\n{}\n{}", style(&title).cyan().bold(), style(underline).cyan())
}
