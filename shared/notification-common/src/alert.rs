use chrono::{DateTime, Utc};
use fnv::FnvHasher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::Hasher;

/// Label or annotation set. Keys are unique and iterate in sorted order.
pub type LabelSet = BTreeMap<String, String>;

const LABEL_SEPARATOR: u8 = 0xff;

/// Alert lifecycle state at a given instant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
        }
    }
}

/// A single alert as handed over by the alerting engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default)]
    pub annotations: LabelSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
}

impl Alert {
    pub fn new(labels: LabelSet, annotations: LabelSet) -> Self {
        Self {
            labels,
            annotations,
            ..Self::default()
        }
    }

    /// An alert is resolved once its end time has passed.
    pub fn status_at(&self, now: DateTime<Utc>) -> AlertStatus {
        match self.ends_at {
            Some(ends_at) if ends_at <= now => AlertStatus::Resolved,
            _ => AlertStatus::Firing,
        }
    }

    /// FNV-1a hash of the sorted label set, as 16 hex digits
    pub fn fingerprint(&self) -> String {
        let mut hasher = FnvHasher::default();
        for (name, value) in &self.labels {
            hasher.write(name.as_bytes());
            hasher.write_u8(LABEL_SEPARATOR);
            hasher.write(value.as_bytes());
            hasher.write_u8(LABEL_SEPARATOR);
        }
        format!("{:016x}", hasher.finish())
    }
}

/// Keys wrapped in double underscores carry engine metadata and are never shown to users.
pub fn is_private_key(key: &str) -> bool {
    key.len() > 4 && key.starts_with("__") && key.ends_with("__")
}
