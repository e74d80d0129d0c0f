use crate::protocol::constants::{
    CHANNEL_NAME_MAX_LENGTH, PRESENCE_CHANNEL_PREFIX, PRIVATE_CHANNEL_PREFIX,
    PRIVATE_ENCRYPTED_CHANNEL_PREFIX,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CHANNEL_NAME_PATTERN: Regex =
        Regex::new(crate::protocol::constants::CHANNEL_NAME_REGEX)
            .expect("channel name pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    Public,
    Private,
    Presence,
    PrivateEncrypted,
}

impl ChannelType {
    pub fn from_name(channel_name: &str) -> Self {
        if channel_name.starts_with(PRIVATE_ENCRYPTED_CHANNEL_PREFIX) {
            Self::PrivateEncrypted
        } else if channel_name.starts_with(PRIVATE_CHANNEL_PREFIX) {
            Self::Private
        } else if channel_name.starts_with(PRESENCE_CHANNEL_PREFIX) {
            Self::Presence
        } else {
            Self::Public
        }
    }

    pub fn requires_authentication(&self) -> bool {
        matches!(
            self,
            ChannelType::Private | ChannelType::Presence | ChannelType::PrivateEncrypted
        )
    }

    pub fn is_presence(&self) -> bool {
        matches!(self, ChannelType::Presence)
    }
}

/// Checks the character set and length the provider accepts for channel names.
pub fn is_valid_channel_name(channel_name: &str) -> bool {
    channel_name.len() <= CHANNEL_NAME_MAX_LENGTH && CHANNEL_NAME_PATTERN.is_match(channel_name)
}
