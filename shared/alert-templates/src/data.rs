//! Projection of an alert group into the data tree templates render against.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use gtmpl::Value;
use notification_common::{is_private_key, Alert, AlertStatus, LabelSet, NotifyContext};
use tracing::debug;
use url::Url;

const DASHBOARD_UID: &str = "__dashboardUid__";
const PANEL_ID: &str = "__panelId__";
const ORG_ID: &str = "__orgId__";
const VALUES: &str = "__values__";
const VALUE_STRING: &str = "__value_string__";

/// Append `extra` to the path of `base`, keeping its query and fragment
pub fn join_url_path(base: &Url, extra: &str) -> Url {
    let mut joined = base.clone();
    let path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        extra.trim_start_matches('/')
    );
    joined.set_path(&path);
    joined
}

/// Closed record: templates referencing an unknown field fail to execute
fn object(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    )
}

/// Open map: unknown keys render as `<no value>`
fn label_map(set: &LabelSet) -> Value {
    Value::Map(
        set.iter()
            .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
            .collect::<HashMap<_, _>>(),
    )
}

fn public(set: &LabelSet) -> LabelSet {
    set.iter()
        .filter(|(key, _)| !is_private_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Key/value pairs shared with identical values by every set
fn common(sets: &[LabelSet]) -> LabelSet {
    let mut iter = sets.iter();
    let mut shared = match iter.next() {
        Some(first) => first.clone(),
        None => return LabelSet::new(),
    };
    for set in iter {
        shared.retain(|key, value| set.get(key) == Some(&*value));
    }
    shared
}

fn timestamp(at: Option<DateTime<Utc>>) -> Value {
    Value::from(
        at.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
    )
}

fn silence_url(external_url: &Url, labels: &LabelSet) -> String {
    let mut silence = join_url_path(external_url, "alerting/silence/new");
    {
        let mut query = silence.query_pairs_mut();
        query.append_pair("alertmanager", "grafana");
        for (name, value) in labels {
            query.append_pair("matcher", &format!("{}={}", name, value));
        }
    }
    silence.to_string()
}

/// Dashboard and panel links derived from the alert's private annotations
fn dashboard_links(external_url: &Url, annotations: &LabelSet) -> (String, String) {
    let uid = match annotations.get(DASHBOARD_UID).filter(|uid| !uid.is_empty()) {
        Some(uid) => uid,
        None => return (String::new(), String::new()),
    };

    let mut dashboard = join_url_path(external_url, &format!("d/{}", uid));
    if let Some(org_id) = annotations.get(ORG_ID).filter(|id| !id.is_empty()) {
        dashboard.query_pairs_mut().append_pair("orgId", org_id);
    }

    let panel = match annotations.get(PANEL_ID).filter(|id| !id.is_empty()) {
        Some(panel_id) => {
            let mut panel = dashboard.clone();
            panel.query_pairs_mut().append_pair("viewPanel", panel_id);
            panel.to_string()
        }
        None => String::new(),
    };

    (dashboard.to_string(), panel)
}

/// Integral readings are kept as integers so they print without a fraction
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn values(annotations: &LabelSet) -> Value {
    let parsed = annotations.get(VALUES).and_then(|raw| {
        serde_json::from_str::<BTreeMap<String, f64>>(raw)
            .map_err(|e| debug!("Ignoring malformed {} annotation: {}", VALUES, e))
            .ok()
    });

    Value::Map(
        parsed
            .unwrap_or_default()
            .into_iter()
            .map(|(ref_id, value)| (ref_id, number(value)))
            .collect(),
    )
}

fn extend_alert(alert: &Alert, external_url: &Url, now: DateTime<Utc>) -> Value {
    let labels = public(&alert.labels);
    let (dashboard_url, panel_url) = dashboard_links(external_url, &alert.annotations);
    let value_string = alert
        .annotations
        .get(VALUE_STRING)
        .cloned()
        .unwrap_or_default();

    object(vec![
        ("Status", Value::from(alert.status_at(now).as_str())),
        ("Labels", label_map(&labels)),
        ("Annotations", label_map(&public(&alert.annotations))),
        ("StartsAt", timestamp(alert.starts_at)),
        ("EndsAt", timestamp(alert.ends_at)),
        ("GeneratorURL", Value::from(alert.generator_url.as_str())),
        ("Fingerprint", Value::from(alert.fingerprint())),
        ("SilenceURL", Value::from(silence_url(external_url, &labels))),
        ("DashboardURL", Value::from(dashboard_url)),
        ("PanelURL", Value::from(panel_url)),
        ("Values", values(&alert.annotations)),
        ("ValueString", Value::from(value_string)),
    ])
}

/// Build the `ExtendedData` tree for one notification
pub(crate) fn extended_data(
    ctx: &NotifyContext,
    alerts: &[Alert],
    external_url: &Url,
    now: DateTime<Utc>,
) -> Value {
    let mut firing = Vec::new();
    let mut resolved = Vec::new();

    for alert in alerts {
        let extended = extend_alert(alert, external_url, now);
        match alert.status_at(now) {
            AlertStatus::Firing => firing.push(extended),
            AlertStatus::Resolved => resolved.push(extended),
        }
    }

    let status = if firing.is_empty() {
        AlertStatus::Resolved
    } else {
        AlertStatus::Firing
    };

    let labels: Vec<LabelSet> = alerts.iter().map(|a| public(&a.labels)).collect();
    let annotations: Vec<LabelSet> = alerts.iter().map(|a| public(&a.annotations)).collect();

    object(vec![
        ("Receiver", Value::from(ctx.receiver.as_str())),
        ("Status", Value::from(status.as_str())),
        (
            "Alerts",
            object(vec![
                ("Firing", Value::Array(firing)),
                ("Resolved", Value::Array(resolved)),
            ]),
        ),
        ("GroupLabels", label_map(&public(&ctx.group_labels))),
        ("CommonLabels", label_map(&common(&labels))),
        ("CommonAnnotations", label_map(&common(&annotations))),
        ("ExternalURL", Value::from(external_url.as_str())),
        ("GroupKey", Value::from(ctx.group_key.as_str())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn set(pairs: &[(&str, &str)]) -> LabelSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn localhost() -> Url {
        Url::parse("http://localhost").unwrap()
    }

    fn field<'a>(data: &'a Value, path: &[&str]) -> &'a Value {
        path.iter().fold(data, |current, name| match current {
            Value::Object(fields) | Value::Map(fields) => fields
                .get(*name)
                .unwrap_or_else(|| panic!("missing field {}", name)),
            other => panic!("{} is not a record: {}", name, other),
        })
    }

    fn text(data: &Value, path: &[&str]) -> String {
        field(data, path).to_string()
    }

    fn keys(data: &Value, path: &[&str]) -> Vec<String> {
        match field(data, path) {
            Value::Object(fields) | Value::Map(fields) => {
                let mut keys: Vec<String> = fields.keys().cloned().collect();
                keys.sort();
                keys
            }
            other => panic!("not a record: {}", other),
        }
    }

    fn count(data: &Value, path: &[&str]) -> usize {
        match field(data, path) {
            Value::Array(items) => items.len(),
            other => panic!("not a list: {}", other),
        }
    }

    #[test]
    fn test_join_url_path() {
        assert_eq!(
            join_url_path(&localhost(), "alerting/list").as_str(),
            "http://localhost/alerting/list"
        );
        let sub_path = Url::parse("https://grafana.example.com/grafana/").unwrap();
        assert_eq!(
            join_url_path(&sub_path, "/d/abcd").as_str(),
            "https://grafana.example.com/grafana/d/abcd"
        );
    }

    #[test]
    fn test_alert_links() {
        let alert = Alert::new(
            set(&[("alertname", "alert1"), ("lbl1", "val1")]),
            set(&[
                ("ann1", "annv1"),
                ("__dashboardUid__", "abcd"),
                ("__panelId__", "efgh"),
                ("__values__", "{\"A\": 1234, \"B\": 0.5}"),
                ("__value_string__", "1234"),
            ]),
        );
        let extended = extend_alert(&alert, &localhost(), Utc::now());

        assert_eq!(
            text(&extended, &["SilenceURL"]),
            "http://localhost/alerting/silence/new?alertmanager=grafana&matcher=alertname%3Dalert1&matcher=lbl1%3Dval1"
        );
        assert_eq!(text(&extended, &["DashboardURL"]), "http://localhost/d/abcd");
        assert_eq!(
            text(&extended, &["PanelURL"]),
            "http://localhost/d/abcd?viewPanel=efgh"
        );
        assert_eq!(text(&extended, &["Values", "A"]), "1234");
        assert_eq!(text(&extended, &["Values", "B"]), "0.5");
        assert_eq!(text(&extended, &["ValueString"]), "1234");
        assert_eq!(keys(&extended, &["Annotations"]), vec!["ann1"]);
        assert_eq!(text(&extended, &["Annotations", "ann1"]), "annv1");
    }

    #[test]
    fn test_dashboard_with_org_id() {
        let annotations = set(&[
            ("__dashboardUid__", "abcd"),
            ("__orgId__", "2"),
            ("__panelId__", "5"),
        ]);
        let (dashboard, panel) = dashboard_links(&localhost(), &annotations);
        assert_eq!(dashboard, "http://localhost/d/abcd?orgId=2");
        assert_eq!(panel, "http://localhost/d/abcd?orgId=2&viewPanel=5");
    }

    #[test]
    fn test_no_dashboard_without_uid() {
        let (dashboard, panel) = dashboard_links(&localhost(), &set(&[("__panelId__", "5")]));
        assert!(dashboard.is_empty());
        assert!(panel.is_empty());
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let parsed = values(&set(&[("__values__", "not json")]));
        assert!(matches!(parsed, Value::Map(ref map) if map.is_empty()));
    }

    #[test]
    fn test_extended_data_groups_alerts() {
        let now = Utc::now();
        let firing = Alert::new(set(&[("alertname", "a"), ("lbl1", "val1")]), LabelSet::new());
        let mut resolved = Alert::new(set(&[("alertname", "a"), ("lbl1", "val2")]), LabelSet::new());
        resolved.ends_at = Some(now - Duration::minutes(1));

        let ctx = NotifyContext::new()
            .with_group_key("alertname")
            .with_group_labels(set(&[("alertname", "a"), ("__private__", "x")]))
            .with_receiver("dingding");
        let data = extended_data(&ctx, &[firing, resolved], &localhost(), now);

        assert_eq!(text(&data, &["Status"]), "firing");
        assert_eq!(count(&data, &["Alerts", "Firing"]), 1);
        assert_eq!(count(&data, &["Alerts", "Resolved"]), 1);
        assert_eq!(keys(&data, &["CommonLabels"]), vec!["alertname"]);
        assert_eq!(keys(&data, &["GroupLabels"]), vec!["alertname"]);
        assert_eq!(text(&data, &["Receiver"]), "dingding");
        assert_eq!(text(&data, &["GroupKey"]), "alertname");
    }

    #[test]
    fn test_all_resolved_status() {
        let now = Utc::now();
        let mut alert = Alert::new(set(&[("alertname", "a")]), LabelSet::new());
        alert.ends_at = Some(now - Duration::seconds(5));

        let data = extended_data(&NotifyContext::new(), &[alert], &localhost(), now);
        assert_eq!(text(&data, &["Status"]), "resolved");
    }
}
