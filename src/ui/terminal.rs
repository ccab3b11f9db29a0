use crate::models::ReconcileReport;
use crate::state::{Phase, ProgressEvent};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Drive a progress bar from a progress event subscription.
///
/// The task ends when the sending side (the run state) is dropped. Lagged
/// events are harmless since every event carries the absolute position.
pub fn spawn_progress_bar(
    mut events: broadcast::Receiver<ProgressEvent>,
    total: usize,
    quiet: bool,
) -> JoinHandle<()> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr())
    };
    if let Ok(progress_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
    {
        bar.set_style(progress_style.progress_chars("█▓░"));
    }

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ProgressEvent::PhaseStarted { phase, .. }) => bar.set_message(match phase {
                    Phase::Directories => "directories",
                    Phase::Files => "files",
                }),
                Ok(ProgressEvent::ItemCompleted { completed, .. }) => {
                    bar.set_position(completed as u64)
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        bar.finish_and_clear();
    })
}

/// Print unresolved clips, destination skips and errors, then the
/// completion line.
pub fn print_report(unresolved: &[String], report: &ReconcileReport) {
    if !unresolved.is_empty() {
        println!("{}", style("Unresolved clips (no media file found):").yellow());
        for path in unresolved {
            println!("{}", style(format!("    - {}", path)).yellow());
        }
    }

    if !report.skipped.is_empty() {
        println!("{}", style("Skipped files:").yellow());
        for path in &report.skipped {
            println!("{}", style(format!("    - {}", path)).yellow());
        }
    }

    if report.has_errors() {
        eprintln!("{}", style("Errors encountered during the process:").red());
        for err in &report.errors {
            eprintln!(
                "{}",
                style(format!("    - Item: {}, Error: {}", err.path, err.message)).red()
            );
        }
    }

    println!("{}", style("Process completed.").green());
}
