//! Progress reporting and cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag used to stop a running comparison between rows
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Turns processed-row counts into whole percentages.
///
/// The callback only fires when the percentage changes, so it sees a
/// non-decreasing sequence that ends at 100.
pub struct ProgressTracker<'a, 'p> {
    total: usize,
    processed: usize,
    last: Option<u8>,
    callback: Option<&'a mut (dyn FnMut(u8) + 'p)>,
}

impl<'a, 'p> ProgressTracker<'a, 'p> {
    pub fn new(total: usize, callback: Option<&'a mut (dyn FnMut(u8) + 'p)>) -> Self {
        Self {
            total,
            processed: 0,
            last: None,
            callback,
        }
    }

    /// Record one more processed row
    pub fn advance(&mut self) {
        self.processed += 1;
        let percent = percent_of(self.processed, self.total);
        self.emit(percent);
    }

    /// Report completion
    pub fn finish(&mut self) {
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        if self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        if let Some(callback) = self.callback.as_deref_mut() {
            callback(percent);
        }
    }
}

/// `floor(processed / total * 100)`, with an empty total counting as done
pub fn percent_of(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed.min(total) as u128 * 100) / total as u128;
    percent as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(0, 3), 0);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 66);
        assert_eq!(percent_of(3, 3), 100);
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn test_tracker_skips_repeats() {
        let mut seen = Vec::new();
        let mut record = |p: u8| seen.push(p);
        let mut tracker = ProgressTracker::new(400, Some(&mut record));
        for _ in 0..400 {
            tracker.advance();
        }
        tracker.finish();

        assert_eq!(seen.len(), 100);
        assert_eq!(seen.first(), Some(&1));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_cancellation_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
