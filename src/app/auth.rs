use crate::app::config::AppCredentials;
use crate::channel::ChannelType;
use crate::channel::types::is_valid_channel_name;
use crate::error::{Error, Result};
use crate::presence::PresenceMember;
use crate::protocol::constants::{ENCRYPTION_MASTER_KEY_LENGTH, SOCKET_ID_REGEX};
use crate::protocol::messages::ChannelAuthResponse;
use crate::token::Token;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref SOCKET_ID_PATTERN: Regex =
        Regex::new(SOCKET_ID_REGEX).expect("socket id pattern is valid");
}

/// Produces signed channel grants.
///
/// Implementations are pure and synchronous; the gateway calls them from many
/// requests at once without coordination.
pub trait ChannelSigner: Send + Sync {
    fn authorize_channel(
        &self,
        socket_id: &str,
        channel_name: &str,
        member: Option<&PresenceMember>,
    ) -> Result<ChannelAuthResponse>;
}

/// Signs grants exactly as the provider's server SDKs do.
pub struct PusherSigner {
    token: Token,
    encryption_master_key: Option<[u8; ENCRYPTION_MASTER_KEY_LENGTH]>,
}

impl PusherSigner {
    pub fn new(credentials: &AppCredentials) -> Self {
        PusherSigner {
            token: Token::new(credentials.key.clone(), credentials.secret.clone()),
            encryption_master_key: credentials.encryption_master_key,
        }
    }

    pub fn data_to_sign(socket_id: &str, channel_name: &str, channel_data: Option<&str>) -> String {
        match channel_data {
            Some(data) => format!("{}:{}:{}", socket_id, channel_name, data),
            None => format!("{}:{}", socket_id, channel_name),
        }
    }

    fn shared_secret(&self, channel_name: &str) -> Result<String> {
        let master_key = self
            .encryption_master_key
            .as_ref()
            .ok_or_else(|| Error::EncryptionKeyMissing(channel_name.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(channel_name.as_bytes());
        hasher.update(master_key);
        Ok(STANDARD.encode(hasher.finalize()))
    }
}

impl ChannelSigner for PusherSigner {
    fn authorize_channel(
        &self,
        socket_id: &str,
        channel_name: &str,
        member: Option<&PresenceMember>,
    ) -> Result<ChannelAuthResponse> {
        if !SOCKET_ID_PATTERN.is_match(socket_id) {
            return Err(Error::InvalidSocketId(socket_id.to_string()));
        }
        if !is_valid_channel_name(channel_name) {
            return Err(Error::InvalidChannelName(channel_name.to_string()));
        }

        let channel_data = member.map(PresenceMember::to_channel_data).transpose()?;
        let auth = self.token.auth_string(&Self::data_to_sign(
            socket_id,
            channel_name,
            channel_data.as_deref(),
        ))?;

        let shared_secret = match ChannelType::from_name(channel_name) {
            ChannelType::PrivateEncrypted => Some(self.shared_secret(channel_name)?),
            _ => None,
        };

        Ok(ChannelAuthResponse {
            auth,
            channel_data,
            shared_secret,
        })
    }
}
