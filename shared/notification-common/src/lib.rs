//! Shared types and utilities for alert notifiers
//!
//! This library provides the alert data model, the per-notification context,
//! receiver metadata and the webhook delivery contract used by every
//! notification provider in the workspace.

pub mod alert;
pub mod context;
pub mod receiver;
pub mod webhook;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utilities;

// Re-export commonly used types
pub use alert::{is_private_key, Alert, AlertStatus, LabelSet};
pub use context::NotifyContext;
pub use receiver::{Notifier, ReceiverMetadata};
pub use webhook::{HttpWebhookSender, ResponseValidator, WebhookError, WebhookMessage, WebhookSender};
