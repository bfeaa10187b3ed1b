use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time view of a session's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchProgress {
    pub keys_tested: u64,
    pub total_keys: u64,
    pub elapsed: Duration,
    pub keys_per_second: f64,
    pub active_workers: usize,
}

impl SearchProgress {
    pub fn percent(&self) -> f64 {
        if self.total_keys == 0 {
            return 100.0;
        }
        self.keys_tested as f64 * 100.0 / self.total_keys as f64
    }

    pub fn remaining(&self) -> u64 {
        self.total_keys.saturating_sub(self.keys_tested)
    }

    /// Time left at the current throughput; `None` until a rate is known.
    pub fn eta(&self) -> Option<Duration> {
        if self.keys_per_second <= 0.0 || !self.keys_per_second.is_finite() {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.remaining() as f64 / self.keys_per_second,
        ))
    }

    pub fn is_complete(&self) -> bool {
        self.keys_tested >= self.total_keys
    }
}

/// `1h 2m 3s`, `2m 3s` or `3s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// `1.25M`, `980.0K`, `512`.
pub fn format_rate(keys_per_second: f64) -> String {
    if keys_per_second >= 1_000_000.0 {
        format!("{:.2}M", keys_per_second / 1_000_000.0)
    } else if keys_per_second >= 1_000.0 {
        format!("{:.1}K", keys_per_second / 1_000.0)
    } else {
        format!("{:.0}", keys_per_second)
    }
}
