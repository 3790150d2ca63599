/// Trait for reporting session progress.
///
/// The CLI implements this with an indicatif spinner; tests use the no-op
/// reporter. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_progress(&self, _candidates_found: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_candidates: usize, _duration_secs: f64) {}
    fn on_selection_complete(&self, _picked: usize, _recycled: bool) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
