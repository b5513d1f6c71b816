//! Default notification templates shipped with every `Templates` instance.

/// Title used when a receiver does not configure its own
pub const DEFAULT_MESSAGE_TITLE_EMBED: &str = r#"{{ template "default.title" . }}"#;

/// Body used when a receiver does not configure its own
pub const DEFAULT_MESSAGE_EMBED: &str = r#"{{ template "default.message" . }}"#;

pub(crate) const DEFAULT_TEMPLATES: &str = r#"{{ define "__subject" }}[{{ .Status | toUpper }}{{ if eq .Status "firing" }}:{{ .Alerts.Firing | len }}{{ if gt (.Alerts.Resolved | len) 0 }}, RESOLVED:{{ .Alerts.Resolved | len }}{{ end }}{{ end }}] {{ labelValues .GroupLabels | join " " }} {{ if gt (len .CommonLabels) (len .GroupLabels) }}({{ removeLabels .CommonLabels (labelNames .GroupLabels) | labelValues | join " " }}){{ end }}{{ end }}

{{ define "__text_values_list" }}{{ if gt (len .Values) 0 }}{{ range $i, $pair := sortedPairs .Values }}{{ if gt $i 0 }}, {{ end }}{{ .Name }}={{ .Value }}{{ end }}{{ else }}[no value]{{ end }}{{ end }}

{{ define "__text_alert_list" }}{{ range . }}
Value: {{ template "__text_values_list" . }}
Labels:
{{ range sortedPairs .Labels }} - {{ .Name }} = {{ .Value }}
{{ end }}Annotations:
{{ range sortedPairs .Annotations }} - {{ .Name }} = {{ .Value }}
{{ end }}{{ if gt (len .GeneratorURL) 0 }}Source: {{ .GeneratorURL }}
{{ end }}{{ if gt (len .SilenceURL) 0 }}Silence: {{ .SilenceURL }}
{{ end }}{{ if gt (len .DashboardURL) 0 }}Dashboard: {{ .DashboardURL }}
{{ end }}{{ if gt (len .PanelURL) 0 }}Panel: {{ .PanelURL }}
{{ end }}{{ end }}{{ end }}

{{ define "default.title" }}{{ template "__subject" . }}{{ end }}

{{ define "default.message" }}{{ if gt (len .Alerts.Firing) 0 }}**Firing**
{{ template "__text_alert_list" .Alerts.Firing }}{{ if gt (len .Alerts.Resolved) 0 }}

{{ end }}{{ end }}{{ if gt (len .Alerts.Resolved) 0 }}**Resolved**
{{ template "__text_alert_list" .Alerts.Resolved }}{{ end }}{{ end }}
"#;
