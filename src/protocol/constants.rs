pub const CHANNEL_NAME_MAX_LENGTH: usize = 200;
pub const CHANNEL_NAME_REGEX: &str = r"^[a-zA-Z0-9_\-=@,.;]+$";
pub const SOCKET_ID_REGEX: &str = r"^\d+\.\d+$";

pub const PRIVATE_CHANNEL_PREFIX: &str = "private-";
pub const PRIVATE_ENCRYPTED_CHANNEL_PREFIX: &str = "private-encrypted-";
pub const PRESENCE_CHANNEL_PREFIX: &str = "presence-";

pub const ENCRYPTION_MASTER_KEY_LENGTH: usize = 32;

pub const AUTH_ENDPOINT_PATH: &str = "/pusher/auth";
