use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

const GUEST_NAME_PREFIX: &str = "Guest";
const MAX_USER_NAME_LENGTH: usize = 64;

/// Member data attached to a presence grant and broadcast to other members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMember {
    pub user_id: String,
    pub user_info: Value,
}

impl PresenceMember {
    /// Serializes the member the way it is signed and echoed as `channel_data`.
    pub fn to_channel_data(&self) -> Result<String> {
        if self.user_id.is_empty() {
            return Err(Error::InvalidMemberData("user_id must not be empty".into()));
        }
        Ok(serde_json::to_string(self)?)
    }
}

/// What the gateway knows about the subscriber when resolving presence data.
#[derive(Debug, Clone, Copy)]
pub struct MemberContext<'a> {
    pub socket_id: &'a str,
    pub channel_name: &'a str,
    pub user_name: Option<&'a str>,
}

/// Identity hook for presence channels.
///
/// Deployments with a real user system plug their own resolver in here; the
/// default hands every subscription a fresh guest identity.
pub trait MemberResolver: Send + Sync {
    fn resolve(&self, context: MemberContext<'_>) -> Result<PresenceMember>;
}

/// Issues a random `user_<uuid>` identity with a display name per subscription.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuestMemberResolver;

impl MemberResolver for GuestMemberResolver {
    fn resolve(&self, context: MemberContext<'_>) -> Result<PresenceMember> {
        let id = Uuid::new_v4().simple().to_string();
        let name = match context.user_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.chars().take(MAX_USER_NAME_LENGTH).collect(),
            _ => format!("{} {}", GUEST_NAME_PREFIX, &id[..6]),
        };

        Ok(PresenceMember {
            user_id: format!("user_{}", id),
            user_info: json!({ "name": name }),
        })
    }
}
