/// Settings document populating every field the DingDing receiver supports.
/// Contains no secrets.
pub const FULL_VALID_CONFIG_FOR_TESTING: &str = r#"{
	"url": "http://localhost",
	"msgType": "actionCard",
	"title": "Alerts firing: {{ len .Alerts.Firing }}",
	"message": "{{ len .Alerts.Firing }} alerts are firing, {{ len .Alerts.Resolved }} are resolved",
	"at": {
		"atMobiles": ["1234567890", "0987654321"],
		"atUserIds": ["user1", "user2"],
		"isAtAll": true
	}
}"#;
