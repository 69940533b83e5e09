//! Batch progress notification port.

/// Notified after each symbol of a batch with (completed, total, symbol).
pub trait ProgressPort: Sync {
    fn on_progress(&self, completed: usize, total: usize, symbol: &str);
}

impl<F> ProgressPort for F
where
    F: Fn(usize, usize, &str) + Sync,
{
    fn on_progress(&self, completed: usize, total: usize, symbol: &str) {
        self(completed, total, symbol)
    }
}

/// Discards progress notifications.
pub struct NoProgress;

impl ProgressPort for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize, _symbol: &str) {}
}
