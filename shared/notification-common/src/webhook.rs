use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::context::NotifyContext;

const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_BYTES: usize = 1024;

/// Inspects a 2xx response and rejects it with a reason when the service
/// reports a failure in the body.
pub type ResponseValidator = fn(status: u16, body: &[u8]) -> Result<(), String>;

/// A fully composed outbound webhook call, always sent as a POST
#[derive(Debug, Clone)]
pub struct WebhookMessage {
    pub url: String,
    pub body: String,
    pub content_type: String,
    pub validation: Option<ResponseValidator>,
}

impl WebhookMessage {
    /// JSON POST to `url`
    pub fn json(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            content_type: "application/json".to_string(),
            validation: None,
        }
    }

    pub fn with_validation(mut self, validation: ResponseValidator) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Webhook delivery errors
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Webhook delivery cancelled")]
    Cancelled,

    #[error("Webhook request timed out")]
    Timeout,

    #[error("Failed to send webhook request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Webhook returned error status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Webhook response rejected: {0}")]
    Rejected(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for WebhookError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WebhookError::Timeout
        } else {
            WebhookError::Request(error)
        }
    }
}

/// Delivery collaborator used by notifiers
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// Send the message, honouring the context's cancellation and timeout
    async fn send_webhook(
        &self,
        ctx: &NotifyContext,
        message: WebhookMessage,
    ) -> Result<(), WebhookError>;
}

/// Webhook sender backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpWebhookSender {
    client: Client,
}

impl HttpWebhookSender {
    /// Create new webhook sender
    pub fn new() -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(DEFAULT_CLIENT_TIMEOUT)
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn execute(&self, ctx: &NotifyContext, message: WebhookMessage) -> Result<(), WebhookError> {
        let start = Instant::now();

        let mut req_builder = self
            .client
            .post(&message.url)
            .header("Content-Type", &message.content_type);

        if let Some(timeout) = ctx.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.body(message.body).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Webhook response received"
        );

        if !status.is_success() {
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        if let Some(validate) = message.validation {
            validate(status.as_u16(), &body).map_err(WebhookError::Rejected)?;
        }

        Ok(())
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send_webhook(
        &self,
        ctx: &NotifyContext,
        message: WebhookMessage,
    ) -> Result<(), WebhookError> {
        if ctx.is_cancelled() {
            return Err(WebhookError::Cancelled);
        }

        debug!(url = %message.url, "Sending webhook");

        let result = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(WebhookError::Cancelled),
            result = self.execute(ctx, message) => result,
        };

        if let Err(ref e) = result {
            warn!(error = %e, "Webhook delivery failed");
        }
        result
    }
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_ERROR_BODY_BYTES {
        return text.into_owned();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
