pub mod card;
pub mod webhook;

pub use card::{Message, ReportLinks};
pub use webhook::WebhookClient;

use crate::models::TestRunSummary;

pub const DEFAULT_TITLE: &str = "🎯 自动化测试报告";

/// Where and how a run summary is announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub webhook_url: String,
    /// Site root the HTML and Allure reports are published under.
    pub report_base_url: Option<String>,
    pub title: String,
}

/// Build the card that `publish` would send.
pub fn message(summary: &TestRunSummary, delivery: &Delivery) -> Message {
    let links = delivery
        .report_base_url
        .as_deref()
        .and_then(ReportLinks::from_base);
    card::build(summary, &delivery.title, links.as_ref())
}

/// Send the run summary to the webhook. Failures are logged and reported as
/// `false`; the caller decides whether that should fail the build.
pub fn publish(summary: &TestRunSummary, delivery: &Delivery) -> bool {
    let message = message(summary, delivery);
    let result =
        WebhookClient::new(delivery.webhook_url.as_str()).and_then(|client| client.send(&message));

    match result {
        Ok(()) => {
            tracing::info!(
                tier = ?summary.tier(),
                pass_rate = summary.pass_rate(),
                "Successfully sent test report"
            );
            true
        }
        Err(e) => {
            tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to send test report");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::models::{RunCounts, RunTiming};
    use crate::report::{ReportParser, aomaker::AomakerReport, aomaker::tests::SAMPLE_REPORT};
    use super::webhook::tests::mock_webhook;

    fn delivery(webhook_url: String, report_base_url: Option<&str>) -> Delivery {
        Delivery {
            webhook_url,
            report_base_url: report_base_url.map(str::to_string),
            title: DEFAULT_TITLE.to_string(),
        }
    }

    fn summary() -> TestRunSummary {
        TestRunSummary {
            counts: RunCounts::new(5, 0, 0, 0).unwrap(),
            timing: RunTiming::default(),
        }
    }

    #[test]
    fn publish_reports_success() {
        let (url, handle) = mock_webhook(200, r#"{"code":0}"#);

        assert!(publish(&summary(), &delivery(url, None)));
        handle.join().unwrap();
    }

    #[test]
    fn publish_reports_server_error() {
        let (url, handle) = mock_webhook(500, r#"{"code":0}"#);

        assert!(!publish(&summary(), &delivery(url, None)));
        handle.join().unwrap();
    }

    #[test]
    fn publish_reports_rejection() {
        let (url, handle) = mock_webhook(200, r#"{"code":1}"#);

        assert!(!publish(&summary(), &delivery(url, None)));
        handle.join().unwrap();
    }

    #[test]
    fn publish_reports_unreachable_endpoint() {
        assert!(!publish(
            &summary(),
            &delivery("http://127.0.0.1:1/hook".to_string(), None)
        ));
    }

    #[test]
    fn empty_base_url_sends_no_buttons() {
        let message = message(&summary(), &delivery(String::new(), Some("")));

        assert_eq!(message.card.elements.len(), 5);
    }

    #[test]
    fn report_to_webhook() {
        let summary = AomakerReport.parse(SAMPLE_REPORT).unwrap();
        assert_eq!(summary.counts, RunCounts::new(8, 1, 0, 1).unwrap());
        assert_eq!(summary.pass_rate(), 80.0);

        let (url, handle) = mock_webhook(200, r#"{"code":0,"msg":"success"}"#);
        assert!(publish(
            &summary,
            &delivery(url, Some("https://example.com/ci/"))
        ));

        let (_, body) = handle.join().unwrap().unwrap();
        let sent: Value = serde_json::from_str(&body).unwrap();
        let card = &sent["card"];
        assert_eq!(card["header"]["template"], "orange");
        assert_eq!(
            card["elements"][3]["fields"][0]["text"]["content"],
            "**✅ 通过**\n8"
        );
        assert_eq!(
            card["elements"][3]["fields"][1]["text"]["content"],
            "**❌ 失败**\n1"
        );
        assert_eq!(
            card["elements"][5]["actions"][1]["url"],
            "https://example.com/ci/allure/index.html"
        );
    }
}
