use std::sync::Arc;

use alert_templates::{AlertTemplater, TemplateError};
use async_trait::async_trait;
use notification_common::{
    Alert, Notifier, NotifyContext, ReceiverMetadata, WebhookError, WebhookMessage, WebhookSender,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::DingDingConfig;
use crate::formatter::{deep_link, format_dingding_message};
use crate::types::DingDingResponse;

/// Notification errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to template DingDing message: {0}")]
    Template(#[from] TemplateError),

    #[error("failed to marshal DingDing message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Delivery(#[from] WebhookError),
}

/// Sends alert groups to a DingTalk group robot
pub struct DingDingNotifier {
    metadata: ReceiverMetadata,
    config: DingDingConfig,
    sender: Arc<dyn WebhookSender>,
    templater: Arc<dyn AlertTemplater>,
}

impl DingDingNotifier {
    pub fn new(
        metadata: ReceiverMetadata,
        config: DingDingConfig,
        sender: Arc<dyn WebhookSender>,
        templater: Arc<dyn AlertTemplater>,
    ) -> Self {
        Self {
            metadata,
            config,
            sender,
            templater,
        }
    }

    /// Render and serialize the robot message without sending it
    pub fn build_message(
        &self,
        ctx: &NotifyContext,
        alerts: &[Alert],
    ) -> Result<WebhookMessage, NotifyError> {
        let expansion = self.templater.expand(
            ctx,
            alerts,
            &[self.config.message.as_str(), self.config.title.as_str()],
        )?;

        if let Some(err) = &expansion.failure {
            warn!(
                receiver = %self.metadata.name,
                error = %err,
                "Failed to template DingDing message"
            );
        }

        let mut rendered = expansion.rendered.into_iter();
        let text = rendered.next().unwrap_or_default();
        let title = rendered.next().unwrap_or_default();

        let message = format_dingding_message(
            &self.config,
            title,
            text,
            deep_link(self.templater.external_url()),
            expansion.failure.is_some(),
        );
        let body = serde_json::to_string(&message)?;

        Ok(WebhookMessage::json(self.config.url.clone(), body).with_validation(validate_response))
    }
}

/// DingTalk reports failures as a non-zero `errcode` in a 200 response
fn validate_response(_status: u16, body: &[u8]) -> Result<(), String> {
    match serde_json::from_slice::<DingDingResponse>(body) {
        Ok(response) if response.errcode != 0 => Err(format!(
            "errcode {}: {}",
            response.errcode, response.errmsg
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl Notifier for DingDingNotifier {
    type Error = NotifyError;

    async fn notify(&self, ctx: &NotifyContext, alerts: &[Alert]) -> Result<(), NotifyError> {
        debug!(
            receiver = %self.metadata.name,
            alerts = alerts.len(),
            "Executing DingDing notification"
        );

        let message = self.build_message(ctx, alerts)?;

        debug!(url = %message.url, "Sending DingDing message");
        self.sender.send_webhook(ctx, message).await.map_err(|e| {
            error!(receiver = %self.metadata.name, error = %e, "Failed to send DingDing message");
            NotifyError::Delivery(e)
        })
    }

    fn send_resolved(&self) -> bool {
        self.metadata.send_resolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_response() {
        assert!(validate_response(200, br#"{"errcode":0,"errmsg":"ok"}"#).is_ok());
        assert!(validate_response(200, b"ok").is_ok());
        assert!(validate_response(200, b"").is_ok());

        let err =
            validate_response(200, br#"{"errcode":310000,"errmsg":"keywords not in content"}"#)
                .unwrap_err();
        assert_eq!(err, "errcode 310000: keywords not in content");
    }

    #[test]
    fn test_delivery_error_is_transparent() {
        let err = NotifyError::from(WebhookError::Rejected("boom".to_string()));
        assert_eq!(
            err.to_string(),
            WebhookError::Rejected("boom".to_string()).to_string()
        );
    }
}
