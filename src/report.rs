use std::sync::Mutex;

use file_roulette::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

/// CLI progress reporter: a spinner during the scan (total unknown upfront),
/// checkmark lines when phases complete.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message("Scanning...");
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_progress(&self, candidates_found: usize, _current_path: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Scanning... {} candidates found", candidates_found));
        }
    }

    fn on_scan_complete(&self, total_candidates: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} candidates in {:.2}s",
            total_candidates, duration_secs
        );
    }

    fn on_selection_complete(&self, picked: usize, recycled: bool) {
        if recycled {
            eprintln!(
                "  \x1b[33m↻\x1b[0m Picked {} file(s), recycling previously opened files",
                picked
            );
        } else {
            eprintln!("  \x1b[32m✓\x1b[0m Picked {} file(s)", picked);
        }
    }
}
