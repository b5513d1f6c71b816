use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::alert::Alert;
use crate::context::NotifyContext;

/// Identity and delivery flags shared by every configured receiver
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub uid: String,
    #[serde(default)]
    pub disable_resolve_message: bool,
}

impl ReceiverMetadata {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            uid: uid.into(),
            disable_resolve_message: false,
        }
    }

    /// Whether the dispatcher should deliver notifications for resolved alerts.
    pub fn send_resolved(&self) -> bool {
        !self.disable_resolve_message
    }
}

/// Base trait that all alert notifiers implement
#[async_trait]
pub trait Notifier: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one notification for the alert group
    async fn notify(&self, ctx: &NotifyContext, alerts: &[Alert]) -> Result<(), Self::Error>;

    fn send_resolved(&self) -> bool;
}
