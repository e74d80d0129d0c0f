use serde::{Deserialize, Serialize};

/// Body of a channel authorization request as sent by the client library.
///
/// Every field is optional at the wire level so that absent and empty values can
/// be reported together instead of failing on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelAuthRequest {
    #[serde(default)]
    pub socket_id: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    /// Display name offered by the client for presence channels.
    #[serde(default)]
    pub user_name: Option<String>,
}

impl ChannelAuthRequest {
    /// Names of required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.socket_id) {
            missing.push("socket_id");
        }
        if is_blank(&self.channel_name) {
            missing.push("channel_name");
        }
        missing
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// The grant returned to the client. Field names are fixed by the client library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAuthResponse {
    pub auth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
}
