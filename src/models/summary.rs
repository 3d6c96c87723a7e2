use crate::models::Tier;

/// Placeholder rendered for timing fields the report does not carry.
pub const UNKNOWN: &str = "未知";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub broken: u64,
    pub skipped: u64,
}

impl RunCounts {
    /// Build counts from the four outcome buckets. Returns `None` if the total overflows.
    pub fn new(passed: u64, failed: u64, broken: u64, skipped: u64) -> Option<Self> {
        let total = passed
            .checked_add(failed)?
            .checked_add(broken)?
            .checked_add(skipped)?;
        Some(Self {
            total,
            passed,
            failed,
            broken,
            skipped,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTiming {
    pub start: String,
    pub end: String,
    pub duration: String,
}

impl Default for RunTiming {
    fn default() -> Self {
        Self {
            start: UNKNOWN.into(),
            end: UNKNOWN.into(),
            duration: UNKNOWN.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestRunSummary {
    pub counts: RunCounts,
    pub timing: RunTiming,
}

impl TestRunSummary {
    /// The summary reported when nothing usable could be read from the report.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Percentage of passed cases, 0 for an empty run. Not rounded.
    pub fn pass_rate(&self) -> f64 {
        let RunCounts { total, passed, .. } = self.counts;
        if total == 0 {
            return 0.0;
        }
        passed as f64 / total as f64 * 100.0
    }

    pub fn tier(&self) -> Tier {
        Tier::from_pass_rate(self.pass_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_buckets() {
        let counts = RunCounts::new(8, 1, 0, 1).unwrap();
        assert_eq!(counts.total, 10);
        assert_eq!(
            counts.total,
            counts.passed + counts.failed + counts.broken + counts.skipped
        );
    }

    #[test]
    fn total_overflow_is_rejected() {
        assert!(RunCounts::new(u64::MAX, 1, 0, 0).is_none());
    }

    #[test]
    fn zeroed_summary_has_unknown_timing() {
        let summary = TestRunSummary::zeroed();
        assert_eq!(summary.counts, RunCounts::default());
        assert_eq!(summary.timing.start, UNKNOWN);
        assert_eq!(summary.timing.end, UNKNOWN);
        assert_eq!(summary.timing.duration, UNKNOWN);
    }

    #[test]
    fn empty_run_has_zero_pass_rate() {
        assert_eq!(TestRunSummary::zeroed().pass_rate(), 0.0);
    }

    #[test]
    fn pass_rate_is_a_percentage() {
        let summary = TestRunSummary {
            counts: RunCounts::new(8, 1, 0, 1).unwrap(),
            ..Default::default()
        };
        assert_eq!(summary.pass_rate(), 80.0);
        assert_eq!(summary.tier(), Tier::Partial);
    }
}
