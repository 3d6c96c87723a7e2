use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for the whole request, connect included.
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of a response body kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The underlying error never carries the URL, whose path holds the hook token.
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("webhook rejected the message (code {code:?}): {msg}")]
    Rejected { code: Option<i64>, msg: String },

    #[error("webhook response is not valid JSON: {body}")]
    MalformedResponse {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        DeliveryError::Transport(e.without_url())
    }
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Transport(e) if e.is_timeout())
    }
}

/// Reply body of a chat-bot webhook. Newer endpoints answer with `code`/`msg`,
/// older ones with `StatusCode`/`StatusMessage`.
#[derive(Debug, Deserialize)]
struct WebhookReply {
    code: Option<i64>,
    msg: Option<String>,
    #[serde(rename = "StatusCode")]
    status_code: Option<i64>,
    #[serde(rename = "StatusMessage")]
    status_message: Option<String>,
}

impl WebhookReply {
    fn code(&self) -> Option<i64> {
        self.code.or(self.status_code)
    }

    fn into_message(self) -> String {
        self.msg.or(self.status_message).unwrap_or_default()
    }
}

/// Truncate a response body for errors and logs.
fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// Single-shot JSON poster for a chat-bot webhook. Never retries.
pub struct WebhookClient {
    url: String,
    client: Client,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> Result<Self, DeliveryError> {
        Self::with_timeout(url, TIMEOUT)
    }

    pub(crate) fn with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reportbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// POST `payload` as JSON. Succeeds only on a 2xx status whose body carries code 0.
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), DeliveryError> {
        let response = self.client.post(&self.url).json(payload).send()?;
        let status = response.status();
        let body = response.text()?;
        tracing::debug!(status = status.as_u16(), body = %excerpt(&body), "Webhook responded");

        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let reply: WebhookReply = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(source) => {
                return Err(DeliveryError::MalformedResponse {
                    body: excerpt(&body),
                    source,
                });
            }
        };
        match reply.code() {
            Some(0) => Ok(()),
            code => Err(DeliveryError::Rejected {
                code,
                msg: reply.into_message(),
            }),
        }
    }
}
