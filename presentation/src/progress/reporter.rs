//! Progress reporting for middleware calls

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sb_application::ProgressNotifier;
use std::sync::Mutex;
use std::time::Duration;

/// Operations whose reply keeps arriving after the call returns.
const STREAMING: [&str; 3] = ["Chat", "AddFiles", "DownloadFiles"];

/// Shows a spinner while a call is in flight
///
/// A chat keeps its spinner until the first fragment arrives, so the
/// streamed text is never interleaved with spinner frames. Uploads and
/// downloads turn the spinner into a percentage bar once progress arrives.
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:30.green/white}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear(&self) {
        if let Some(pb) = self.slot().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_call_start(&self, operation: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(operation.to_string());
        pb.set_message("waiting for middleware...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.slot().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn on_call_complete(&self, operation: &str, success: bool) {
        // Streams keep their indicator until data arrives
        if success && STREAMING.contains(&operation) {
            return;
        }
        self.clear();
    }

    fn on_first_fragment(&self) {
        self.clear();
    }

    fn on_stream_end(&self, _success: bool) {
        self.clear();
    }

    fn on_transfer_progress(&self, operation: &str, percent: Option<u8>, detail: &str) {
        let mut slot = self.slot();
        let pb = slot.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_prefix(operation.to_string());
            pb
        });
        if let Some(percent) = percent {
            if pb.length() != Some(100) {
                pb.disable_steady_tick();
                pb.set_length(100);
                pb.set_style(Self::bar_style());
            }
            pb.set_position(u64::from(percent));
        }
        pb.set_message(detail.to_string());
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_call_start(&self, operation: &str) {
        eprintln!("{} {}", "->".cyan(), operation.bold());
    }

    fn on_call_complete(&self, operation: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), operation);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), operation);
        }
    }

    fn on_transfer_progress(&self, _operation: &str, percent: Option<u8>, detail: &str) {
        if let Some(percent) = percent {
            eprintln!("  {:>3}% {}", percent, detail);
        }
    }
}
