//! Test utilities for notifiers
//!
//! Recording collaborators that stand in for real delivery in unit and
//! integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::context::NotifyContext;
use crate::webhook::{WebhookError, WebhookMessage, WebhookSender};

/// Webhook sender that records every message instead of sending it
#[derive(Debug, Default)]
pub struct RecordingWebhookSender {
    sent: Mutex<Vec<WebhookMessage>>,
    failure: Mutex<Option<String>>,
}

impl RecordingWebhookSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender that records the message and then answers with a rejection
    pub fn failing(reason: impl Into<String>) -> Self {
        let sender = Self::default();
        *sender.failure.lock() = Some(reason.into());
        sender
    }

    /// Most recently sent message
    pub fn last(&self) -> Option<WebhookMessage> {
        self.sent.lock().last().cloned()
    }

    pub fn sent(&self) -> Vec<WebhookMessage> {
        self.sent.lock().clone()
    }

    /// Body of the last message parsed as JSON
    pub fn last_json(&self) -> Option<serde_json::Value> {
        self.last()
            .and_then(|message| serde_json::from_str(&message.body).ok())
    }
}

#[async_trait]
impl WebhookSender for RecordingWebhookSender {
    async fn send_webhook(
        &self,
        _ctx: &NotifyContext,
        message: WebhookMessage,
    ) -> Result<(), WebhookError> {
        self.sent.lock().push(message);
        match self.failure.lock().clone() {
            Some(reason) => Err(WebhookError::Rejected(reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let sender = RecordingWebhookSender::new();
        let ctx = NotifyContext::new();

        sender
            .send_webhook(&ctx, WebhookMessage::json("http://localhost", r#"{"a":1}"#))
            .await
            .unwrap();

        assert_eq!(sender.sent().len(), 1);
        assert_eq!(sender.last_json().unwrap()["a"], 1);
    }

    #[tokio::test]
    async fn test_failing_sender_still_records() {
        let sender = RecordingWebhookSender::failing("boom");
        let result = sender
            .send_webhook(&NotifyContext::new(), WebhookMessage::json("http://localhost", "{}"))
            .await;

        assert!(matches!(result, Err(WebhookError::Rejected(reason)) if reason == "boom"));
        assert!(sender.last().is_some());
    }
}
