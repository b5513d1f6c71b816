use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::alert::LabelSet;

/// Per-notification context supplied by the dispatcher.
///
/// Carries the aggregation group the alerts belong to and the cancellation
/// and timeout that govern the outbound call. Notifiers pass it through to
/// the delivery collaborator without interpreting it.
#[derive(Debug, Clone, Default)]
pub struct NotifyContext {
    pub group_key: String,
    pub group_labels: LabelSet,
    pub receiver: String,
    pub cancellation: CancellationToken,
    pub timeout: Option<Duration>,
}

impl NotifyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_key(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = group_key.into();
        self
    }

    pub fn with_group_labels(mut self, group_labels: LabelSet) -> Self {
        self.group_labels = group_labels;
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
