//! The reporting collaborator.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{error::Error, stats::StatValue};

/// Receives logs, errors and statistics from the engine.
///
/// Every method returns `false` when the entry was dropped.
pub trait Reporter: Send + Sync {
    fn add_log(&self, message: String) -> bool;

    fn add_error(&self, error: Error) -> bool;

    fn add_stat(&self, stat: StatValue) -> bool;
}

/// Forwards logs and errors to the `log` facade and counts statistics.
#[derive(Default)]
pub struct LogReporter {
    counters: [AtomicU64; StatValue::COUNT],
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `stat` has been reported.
    pub fn count(&self, stat: StatValue) -> u64 {
        self.counters[stat.index()].load(Ordering::Relaxed)
    }
}

impl Reporter for LogReporter {
    fn add_log(&self, message: String) -> bool {
        info!("{}", message);
        true
    }

    fn add_error(&self, error: Error) -> bool {
        error!("{}", error);
        true
    }

    fn add_stat(&self, stat: StatValue) -> bool {
        trace!("{}", stat);
        self.counters[stat.index()].fetch_add(1, Ordering::Relaxed);
        true
    }
}
