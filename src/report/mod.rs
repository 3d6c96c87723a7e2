pub mod aomaker;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::TestRunSummary;

/// Where the aomaker run leaves its HTML report, relative to the project root.
pub const DEFAULT_REPORT_PATH: &str = "reports/aomaker-report.html";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected at least 4 legend values, found {found}")]
    MissingLegend { found: usize },

    #[error("legend value {value:?} is not a valid count")]
    InvalidCount { value: String },
}

/// Trait for generator-specific report parsers.
pub trait ReportParser {
    /// Parse the full report document into a summary.
    fn parse(&self, html: &str) -> Result<TestRunSummary, ExtractError>;

    /// Display name for this parser (e.g., "aomaker").
    fn name(&self) -> &str;
}

/// Construct the parser for the report generator in use.
pub fn detect() -> Box<dyn ReportParser> {
    Box::new(aomaker::AomakerReport)
}

/// Read and parse the report at `path`, surfacing the reason on failure.
pub fn try_extract(path: &Path) -> Result<TestRunSummary, ExtractError> {
    let html = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parser = detect();
    tracing::debug!(parser = parser.name(), bytes = html.len(), "Parsing report");
    parser.parse(&html)
}

/// Read the report at `path`. A missing or malformed report is reported as an
/// empty run so the notification still goes out.
pub fn extract(path: &Path) -> TestRunSummary {
    match try_extract(path) {
        Ok(summary) => {
            tracing::info!(
                path = %path.display(),
                total = summary.counts.total,
                passed = summary.counts.passed,
                "Extracted test results"
            );
            summary
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Error reading test results");
            TestRunSummary::zeroed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::{RunCounts, UNKNOWN};

    #[derive(Clone)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn write_report(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("aomaker-report-")
            .suffix(".html")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn extracts_counts_and_timing_from_file() {
        let file = write_report(aomaker::tests::SAMPLE_REPORT);
        let summary = extract(file.path());

        assert_eq!(summary.counts, RunCounts::new(8, 1, 0, 1).unwrap());
        assert_eq!(summary.timing.start, "2025-01-06 10:00:00");
        assert_eq!(summary.timing.end, "2025-01-06 10:05:30");
        assert_eq!(summary.timing.duration, "5分30秒");
    }

    #[test]
    fn missing_file_yields_zeroed_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/aomaker-report.html");

        assert!(matches!(try_extract(&path), Err(ExtractError::Io { .. })));
        assert_eq!(extract(&path), TestRunSummary::zeroed());
    }

    #[test]
    fn insufficient_markers_yield_zeroed_summary() {
        let file = write_report(
            r#"<span class="legend-value">3</span><span class="legend-value">1</span>
               <span class="legend-value">0</span>
               <span class="label">开始时间:</span> <span class="value">2025-01-06 10:00:00</span>"#,
        );
        let summary = extract(file.path());

        assert_eq!(summary, TestRunSummary::zeroed());
        assert_eq!(summary.timing.start, UNKNOWN);
    }

    #[test]
    fn non_utf8_report_yields_zeroed_summary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();

        assert_eq!(extract(file.path()), TestRunSummary::zeroed());
    }

    #[test]
    fn extraction_failure_is_logged_as_warning() {
        let buf = Arc::new(Mutex::new(Vec::<u8>::new()));
        let writer = CaptureWriter(Arc::clone(&buf));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        tracing::subscriber::with_default(subscriber, || {
            extract(&path);
        });

        let logged = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("WARN"), "{logged}");
        assert!(logged.contains("Error reading test results"), "{logged}");
    }
}
