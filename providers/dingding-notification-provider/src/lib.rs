//! DingTalk group robot notifications for alert groups.
//!
//! Alerts are rendered through the shared template library into either a
//! `link` or an `actionCard` robot message and posted to the configured
//! webhook.

pub mod config;
pub mod formatter;
pub mod notifier;
pub mod testing;
pub mod types;

pub use config::{ConfigError, DingDingConfig, DingDingSettings, MessageType};
pub use notifier::{DingDingNotifier, NotifyError};
pub use testing::FULL_VALID_CONFIG_FOR_TESTING;
pub use types::{At, DingDingMessage};
