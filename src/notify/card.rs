use serde::Serialize;

use crate::models::{RunCounts, TestRunSummary};

/// Report page written by aomaker, relative to the published site root.
const REPORT_PAGE: &str = "reports/aomaker-report.html";
/// Allure index, relative to the published site root.
const ALLURE_PAGE: &str = "allure/index.html";

/// Top-level webhook message carrying an interactive card.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub msg_type: &'static str,
    pub card: Card,
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub header: Header,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub title: Text,
    pub template: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTag {
    PlainText,
    LarkMd,
}

#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub tag: TextTag,
    pub content: String,
}

impl Text {
    fn plain(content: impl Into<String>) -> Self {
        Self {
            tag: TextTag::PlainText,
            content: content.into(),
        }
    }

    fn markdown(content: impl Into<String>) -> Self {
        Self {
            tag: TextTag::LarkMd,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum Element {
    Div {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Field>,
    },
    Hr,
    Action {
        actions: Vec<Button>,
    },
}

/// Half-width column inside a `div` row.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub is_short: bool,
    pub text: Text,
}

#[derive(Debug, Clone, Serialize)]
pub struct Button {
    pub tag: &'static str,
    pub text: Text,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
}

/// Links to the published reports, derived from the site base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLinks {
    pub report: String,
    pub allure: String,
}

impl ReportLinks {
    /// Returns `None` for an empty base so no button ever points nowhere.
    pub fn from_base(base: &str) -> Option<Self> {
        let base = base.trim().trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        Some(Self {
            report: format!("{base}/{REPORT_PAGE}"),
            allure: format!("{base}/{ALLURE_PAGE}"),
        })
    }
}

/// Build the interactive card for a finished run.
pub fn build(summary: &TestRunSummary, title: &str, links: Option<&ReportLinks>) -> Message {
    let counts = &summary.counts;
    let timing = &summary.timing;

    let mut elements = vec![
        Element::Div {
            text: Some(Text::markdown(format!(
                "**⏱️ 执行时间**\n开始：{}\n结束：{}\n耗时：{}",
                timing.start, timing.end, timing.duration
            ))),
            fields: Vec::new(),
        },
        Element::Hr,
        row(
            ("📊 总用例数", counts.total.to_string()),
            ("✨ 通过率", format_rate(counts)),
        ),
        row(
            ("✅ 通过", counts.passed.to_string()),
            ("❌ 失败", counts.failed.to_string()),
        ),
        row(
            ("⚠️ 阻塞", counts.broken.to_string()),
            ("⏭️ 跳过", counts.skipped.to_string()),
        ),
    ];

    if let Some(links) = links {
        elements.push(Element::Action {
            actions: vec![
                button("📊 完整测试报告", &links.report),
                button("📈 Allure测试报告", &links.allure),
            ],
        });
    }

    Message {
        msg_type: "interactive",
        card: Card {
            header: Header {
                title: Text::plain(title),
                template: summary.tier().template(),
            },
            elements,
        },
    }
}

/// Pass rate truncated to one decimal, computed on the counts so 99.96 never
/// shows as 100.0 and 57/100 never as 56.9.
fn format_rate(counts: &RunCounts) -> String {
    if counts.total == 0 {
        return "0.0%".to_string();
    }
    let tenths = u128::from(counts.passed) * 1000 / u128::from(counts.total);
    format!("{}.{}%", tenths / 10, tenths % 10)
}

fn row(left: (&str, String), right: (&str, String)) -> Element {
    Element::Div {
        text: None,
        fields: vec![field(left.0, &left.1), field(right.0, &right.1)],
    }
}

fn field(label: &str, value: &str) -> Field {
    Field {
        is_short: true,
        text: Text::markdown(format!("**{label}**\n{value}")),
    }
}

fn button(label: &str, url: &str) -> Button {
    Button {
        tag: "button",
        text: Text::plain(label),
        kind: "primary",
        url: url.to_string(),
    }
}
