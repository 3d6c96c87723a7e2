pub mod summary;
pub mod tier;

pub use summary::{RunCounts, RunTiming, TestRunSummary, UNKNOWN};
pub use tier::Tier;
