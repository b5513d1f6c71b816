use alert_templates::join_url_path;
use url::form_urlencoded;
use url::Url;

use crate::config::{DingDingConfig, MessageType};
use crate::types::{ActionCardContent, DingDingMessage, LinkContent, MessageBody};

const DINGTALK_LINK_BASE: &str = "dingtalk://dingtalkclient/page/link";
const ACTION_CARD_SINGLE_TITLE: &str = "More";

/// Link opening the alert list in the DingTalk client's side panel
pub fn deep_link(external_url: &Url) -> String {
    let alert_list = join_url_path(external_url, "alerting/list");
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("pc_slide", "false")
        .append_pair("url", alert_list.as_str())
        .finish();

    format!("{}?{}", DINGTALK_LINK_BASE, query)
}

/// Build the robot message from already rendered title and text.
///
/// A message whose templates failed to render is always sent as a link so
/// the partial text still reaches the chat.
pub fn format_dingding_message(
    config: &DingDingConfig,
    title: String,
    text: String,
    link: String,
    template_failed: bool,
) -> DingDingMessage {
    let message_type = if template_failed {
        MessageType::Link
    } else {
        config.message_type
    };

    let body = match message_type {
        MessageType::Link => MessageBody::Link {
            link: LinkContent {
                message_url: link,
                text,
                title,
            },
        },
        MessageType::ActionCard => MessageBody::ActionCard {
            action_card: ActionCardContent {
                text,
                title,
                single_title: ACTION_CARD_SINGLE_TITLE.to_string(),
                single_url: link,
            },
        },
    };

    DingDingMessage {
        body,
        at: config.at.clone(),
    }
}
