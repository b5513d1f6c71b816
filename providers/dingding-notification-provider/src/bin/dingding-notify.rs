//! # DingDing notification CLI
//!
//! Sends one notification for the alerts read from stdin as a JSON array.

use std::sync::Arc;

use alert_templates::Templates;
use anyhow::{Context, Result};
use notification_common::{
    Alert, HttpWebhookSender, LabelSet, Notifier, NotifyContext, ReceiverMetadata,
};
use tokio::io::AsyncReadExt;
use tracing::info;
use url::Url;

use dingding_notification_provider::{DingDingConfig, DingDingNotifier, DingDingSettings};

const DEFAULT_EXTERNAL_URL: &str = "http://localhost:3000/";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dingding_notification_provider=info".parse()?),
        )
        .init();

    let settings = DingDingSettings::from_env().context("Failed to load DingDing settings")?;
    let config = DingDingConfig::new(settings).context("Invalid DingDing settings")?;

    let external_url =
        std::env::var("EXTERNAL_URL").unwrap_or_else(|_| DEFAULT_EXTERNAL_URL.to_string());
    let external_url = Url::parse(&external_url).context("Invalid EXTERNAL_URL")?;
    let group_key = std::env::var("GROUP_KEY").unwrap_or_default();

    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("Failed to read alerts from stdin")?;
    let alerts: Vec<Alert> = serde_json::from_slice(&input).context("Failed to parse alerts")?;

    let templater = Templates::new(external_url).context("Failed to load default templates")?;
    let sender = HttpWebhookSender::new().context("Failed to create HTTP client")?;

    let notifier = DingDingNotifier::new(
        ReceiverMetadata::new("dingding-notify", "dingding", ""),
        config,
        Arc::new(sender),
        Arc::new(templater),
    );

    let ctx = NotifyContext::new()
        .with_group_key(group_key)
        .with_group_labels(LabelSet::new())
        .with_receiver("dingding-notify");

    info!("Sending {} alerts to DingDing", alerts.len());
    notifier
        .notify(&ctx, &alerts)
        .await
        .context("Failed to send DingDing notification")?;
    info!("DingDing notification sent");

    Ok(())
}
