use crate::protocol::constants::ENCRYPTION_MASTER_KEY_LENGTH;
use std::fmt;

/// Credentials of the provider application grants are signed for.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub id: String,
    pub key: String,
    pub secret: String,
    pub cluster: String,
    pub use_tls: bool,
    pub encryption_master_key: Option<[u8; ENCRYPTION_MASTER_KEY_LENGTH]>,
}

impl AppCredentials {
    pub fn new(id: String, key: String, secret: String, cluster: String) -> Self {
        Self {
            id,
            key,
            secret,
            cluster,
            use_tls: true,
            encryption_master_key: None,
        }
    }

    pub fn with_encryption_master_key(mut self, key: [u8; ENCRYPTION_MASTER_KEY_LENGTH]) -> Self {
        self.encryption_master_key = Some(key);
        self
    }
}

// The secret and master key never reach logs.
impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("cluster", &self.cluster)
            .field("use_tls", &self.use_tls)
            .field(
                "encryption_master_key",
                &self.encryption_master_key.map(|_| "<redacted>"),
            )
            .finish()
    }
}
