use std::env;
use std::fmt;
use std::str::FromStr;

use alert_templates::{
    TemplateError, Templates, DEFAULT_MESSAGE_EMBED, DEFAULT_MESSAGE_TITLE_EMBED,
};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::types::At;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find url property in settings")]
    MissingUrl,

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(String),

    #[error("invalid {field} template: {source}")]
    InvalidTemplate {
        field: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("failed to unmarshal settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// DingTalk robot message types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[default]
    #[serde(rename = "link")]
    Link,
    #[serde(rename = "actionCard")]
    ActionCard,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Link => "link",
            MessageType::ActionCard => "actionCard",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "link" => Ok(MessageType::Link),
            "actionCard" => Ok(MessageType::ActionCard),
            other => Err(ConfigError::UnsupportedMessageType(other.to_string())),
        }
    }
}

/// Raw receiver settings as stored by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DingDingSettings {
    pub url: String,
    #[serde(alias = "msgtype")]
    pub msg_type: String,
    pub title: String,
    pub message: String,
    pub at: At,
}

impl DingDingSettings {
    /// Load settings from the file named by `DINGDING_CONFIG_PATH`, with the
    /// webhook URL overridable through `DINGDING_WEBHOOK_URL`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Ok(config_path) = env::var("DINGDING_CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path));
        }

        if let Ok(url) = env::var("DINGDING_WEBHOOK_URL") {
            builder = builder.set_override("url", url)?;
        }

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

/// Validated DingDing receiver configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DingDingConfig {
    pub url: String,
    pub message_type: MessageType,
    pub title: String,
    pub message: String,
    pub at: At,
}

impl DingDingConfig {
    pub fn new(settings: DingDingSettings) -> Result<Self, ConfigError> {
        let url = settings.url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let message_type = settings.msg_type.parse()?;
        let title = template_or(settings.title, DEFAULT_MESSAGE_TITLE_EMBED, "title")?;
        let message = template_or(settings.message, DEFAULT_MESSAGE_EMBED, "message")?;

        Ok(Self {
            url: url.to_string(),
            message_type,
            title,
            message,
            at: settings.at,
        })
    }

    /// Parse and validate a JSON settings document
    pub fn from_json(raw: &[u8]) -> Result<Self, ConfigError> {
        let settings: DingDingSettings = serde_json::from_slice(raw)?;
        Self::new(settings)
    }
}

fn template_or(
    value: String,
    default: &str,
    field: &'static str,
) -> Result<String, ConfigError> {
    let template = if value.is_empty() {
        default.to_string()
    } else {
        value
    };
    Templates::check(&template)
        .map_err(|source| ConfigError::InvalidTemplate { field, source })?;
    Ok(template)
}
