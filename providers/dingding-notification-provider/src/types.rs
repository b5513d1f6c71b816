use serde::{Deserialize, Serialize};

/// Users to mention in the group chat
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct At {
    #[serde(alias = "atmobiles")]
    pub at_mobiles: Vec<String>,
    #[serde(alias = "atuserids")]
    pub at_user_ids: Vec<String>,
    #[serde(alias = "isatall")]
    pub is_at_all: bool,
}

/// Robot message as posted to the DingTalk webhook
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DingDingMessage {
    #[serde(flatten)]
    pub body: MessageBody,
    pub at: At,
}

/// Message shape, tagged by `msgtype`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "msgtype")]
pub enum MessageBody {
    #[serde(rename = "link")]
    Link { link: LinkContent },
    #[serde(rename = "actionCard")]
    ActionCard {
        #[serde(rename = "actionCard")]
        action_card: ActionCardContent,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkContent {
    #[serde(rename = "messageUrl")]
    pub message_url: String,
    pub text: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionCardContent {
    pub text: String,
    pub title: String,
    #[serde(rename = "singleTitle")]
    pub single_title: String,
    #[serde(rename = "singleURL")]
    pub single_url: String,
}

/// Body DingTalk answers with, even on HTTP 200
#[derive(Debug, Deserialize)]
pub(crate) struct DingDingResponse {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_link_message_shape() {
        let message = DingDingMessage {
            body: MessageBody::Link {
                link: LinkContent {
                    message_url: "dingtalk://x".to_string(),
                    text: "body".to_string(),
                    title: "title".to_string(),
                },
            },
            at: At::default(),
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "msgtype": "link",
                "link": { "messageUrl": "dingtalk://x", "text": "body", "title": "title" },
                "at": { "atMobiles": [], "atUserIds": [], "isAtAll": false }
            })
        );
    }

    #[test]
    fn test_action_card_message_shape() {
        let message = DingDingMessage {
            body: MessageBody::ActionCard {
                action_card: ActionCardContent {
                    text: "body".to_string(),
                    title: "title".to_string(),
                    single_title: "More".to_string(),
                    single_url: "dingtalk://x".to_string(),
                },
            },
            at: At {
                at_mobiles: vec!["1".to_string()],
                at_user_ids: vec![],
                is_at_all: true,
            },
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "msgtype": "actionCard",
                "actionCard": {
                    "text": "body",
                    "title": "title",
                    "singleTitle": "More",
                    "singleURL": "dingtalk://x"
                },
                "at": { "atMobiles": ["1"], "atUserIds": [], "isAtAll": true }
            })
        );
    }

    #[test]
    fn test_at_accepts_lowercase_keys() {
        let at: At = serde_json::from_str(r#"{"atmobiles": ["1"], "isatall": true}"#).unwrap();
        assert_eq!(at.at_mobiles, vec!["1".to_string()]);
        assert!(at.is_at_all);
        assert!(at.at_user_ids.is_empty());
    }

    #[test]
    fn test_response_defaults() {
        let response: DingDingResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.errcode, 0);
        assert!(response.errmsg.is_empty());
    }
}
