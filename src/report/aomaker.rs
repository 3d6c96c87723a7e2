use std::sync::LazyLock;

use regex::Regex;

use crate::models::{RunCounts, RunTiming, TestRunSummary, UNKNOWN};

use super::{ExtractError, ReportParser};

/// Counts in the report legend. The generator emits them in the order
/// passed, failed, broken, skipped and gives no label to key them by.
static LEGEND_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span class="legend-value">(\d+)</span>"#).unwrap());

static START_TIME: LazyLock<Regex> = LazyLock::new(|| timing_pattern("开始时间"));
static END_TIME: LazyLock<Regex> = LazyLock::new(|| timing_pattern("结束时间"));
static DURATION: LazyLock<Regex> = LazyLock::new(|| timing_pattern("运行时长"));

/// `<label>:</span> <span ...>value</span>`
fn timing_pattern(label: &str) -> Regex {
    Regex::new(&format!(r"{label}:</span>\s*<span[^>]*>([^<]+)</span>")).unwrap()
}

/// Parser for the HTML report written by aomaker.
pub struct AomakerReport;

impl ReportParser for AomakerReport {
    fn parse(&self, html: &str) -> Result<TestRunSummary, ExtractError> {
        let values: Vec<&str> = LEGEND_VALUE
            .captures_iter(html)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect();

        let [passed, failed, broken, skipped] = match values.as_slice() {
            [p, f, b, s, ..] => [p, f, b, s].map(|v| parse_count(v)),
            _ => {
                return Err(ExtractError::MissingLegend {
                    found: values.len(),
                });
            }
        };
        let counts = RunCounts::new(passed?, failed?, broken?, skipped?).ok_or_else(|| {
            ExtractError::InvalidCount {
                value: values[..4].join("+"),
            }
        })?;

        let timing = RunTiming {
            start: capture_or_unknown(&START_TIME, html),
            end: capture_or_unknown(&END_TIME, html),
            duration: capture_or_unknown(&DURATION, html),
        };

        Ok(TestRunSummary { counts, timing })
    }

    fn name(&self) -> &str {
        "aomaker"
    }
}

fn parse_count(value: &str) -> Result<u64, ExtractError> {
    value.parse().map_err(|_| ExtractError::InvalidCount {
        value: value.to_string(),
    })
}

fn capture_or_unknown(pattern: &Regex, html: &str) -> String {
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
