//! Progress bar adapter using indicatif.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use omr_core::{ProgressEvent, ProgressSink};

/// Progress bar adapter for CLI output.
///
/// Events arrive from several worker threads; `indicatif` bars are safe to
/// update concurrently.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of sheets
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise report failures only
    #[must_use]
    pub fn new(total: u64, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = IndicatifBar::new(total);

            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }

            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { name, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(name);
                }
            }
            ProgressEvent::Completed { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::Failed { name, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                    bar.println(format!("WARN: {name}: {reason}"));
                } else {
                    eprintln!("WARN: {name}: {reason}");
                }
            }
            ProgressEvent::Finished {
                processed,
                failed,
                cancelled,
            } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {processed} graded, {failed} failed, {cancelled} cancelled"
                    ));
                }
            }
        }
    }
}
