use serde::{Deserialize, Serialize};

use crate::domain::calculator::reliability::reliability;

/// How a task reacts to a sampled transient fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Faults sampled once a task has been retried this often are ignored.
    pub max_retry_count: u32,
    /// Step a faulted task up to the next higher (more reliable) frequency level.
    pub dvfs_adaptive: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retry_count: u32::MAX, dvfs_adaptive: false }
    }
}

impl RetryPolicy {
    pub fn can_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retry_count
    }
}

/// `true` if a fault hit during `exec_span` seconds at fault rate `lambda`, given a uniform `draw` in `[0, 1)`.
///
/// A fault happens with probability `1 - exp(-lambda * exec_span)`, so a zero
/// fault rate or a zero span never faults.
pub fn is_fault(exec_span: f64, lambda: f64, draw: f64) -> bool {
    draw < 1.0 - reliability(lambda, exec_span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fault_rate_never_faults() {
        for draw in [0.0, 1e-300, 0.5, 0.999_999] {
            assert!(!is_fault(1e9, 0.0, draw));
        }
    }

    #[test]
    fn low_draw_faults_on_long_span() {
        // 1 - exp(-0.01 * 100) ~ 0.632
        assert!(is_fault(100.0, 0.01, 0.6));
        assert!(!is_fault(100.0, 0.01, 0.7));
    }

    #[test]
    fn retry_budget() {
        let policy = RetryPolicy { max_retry_count: 2, dvfs_adaptive: false };
        assert!(policy.can_retry(1));
        assert!(!policy.can_retry(2));
        assert!(RetryPolicy::default().can_retry(1_000_000));
    }
}
