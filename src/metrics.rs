// Run metrics module
//
// Lightweight counters describing what a reconciliation run did

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for one reconciliation run.
///
/// Uses atomic operations so concurrently settling operations can record
/// without taking the state lock.
#[derive(Debug)]
pub struct RunMetrics {
    /// Directories created (or already present)
    pub directories_created: AtomicUsize,

    /// Directories that could not be created
    pub directories_failed: AtomicUsize,

    /// Files copied, moved or linked
    pub files_placed: AtomicUsize,

    /// Files whose destination already existed
    pub files_skipped: AtomicUsize,

    /// Files that failed to transfer
    pub files_failed: AtomicUsize,

    /// Bytes written by copy and move operations
    pub bytes_transferred: AtomicU64,

    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            directories_created: AtomicUsize::new(0),
            directories_failed: AtomicUsize::new(0),
            files_placed: AtomicUsize::new(0),
            files_skipped: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            bytes_transferred: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_directory_created(&self) {
        self.directories_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_directory_failed(&self) {
        self.directories_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a placed file and the bytes it took (0 for links)
    pub fn record_file_placed(&self, bytes: u64) {
        self.files_placed.fetch_add(1, Ordering::Relaxed);
        self.bytes_transferred.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_file_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Relocation Summary ===");
        tracing::info!("Elapsed: {:.2}s", self.elapsed().as_secs_f64());
        tracing::info!(
            "Directories: {} created, {} failed",
            self.directories_created.load(Ordering::Relaxed),
            self.directories_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Files: {} placed, {} skipped, {} failed",
            self.files_placed.load(Ordering::Relaxed),
            self.files_skipped.load(Ordering::Relaxed),
            self.files_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Transferred {:.2} MiB",
            self.bytes_transferred.load(Ordering::Relaxed) as f64 / (1024.0 * 1024.0)
        );
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = RunMetrics::new();
        assert_eq!(metrics.files_placed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.bytes_transferred.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_file_outcomes() {
        let metrics = RunMetrics::new();

        metrics.record_file_placed(100);
        metrics.record_file_placed(0);
        metrics.record_file_skipped();
        metrics.record_file_failed();

        assert_eq!(metrics.files_placed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.bytes_transferred.load(Ordering::Relaxed), 100);
        assert_eq!(metrics.files_skipped.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.files_failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let metrics = std::sync::Arc::new(RunMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = std::sync::Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_directory_created();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.directories_created.load(Ordering::Relaxed), 8000);
    }
}
