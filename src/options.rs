use crate::app::config::AppCredentials;
use crate::origin_validation::OriginPolicy;
use crate::protocol::constants::ENCRYPTION_MASTER_KEY_LENGTH;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::warn;

pub const ENV_APP_ID: &str = "PUSHER_APP_ID";
pub const ENV_APP_KEY: &str = "PUSHER_APP_KEY";
pub const ENV_APP_SECRET: &str = "PUSHER_APP_SECRET";
pub const ENV_APP_CLUSTER: &str = "PUSHER_APP_CLUSTER";
pub const ENV_ENCRYPTION_MASTER_KEY: &str = "PUSHER_ENCRYPTION_MASTER_KEY_BASE64";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_SHUTDOWN_GRACE_PERIOD: &str = "SHUTDOWN_GRACE_PERIOD";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Outcome of reading the provider credentials at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigState {
    Ready(AppCredentials),
    /// Names of the required variables that were absent or empty.
    Degraded(Vec<&'static str>),
}

impl ConfigState {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let id = read(ENV_APP_ID);
        let key = read(ENV_APP_KEY);
        let secret = read(ENV_APP_SECRET);
        let cluster = read(ENV_APP_CLUSTER);

        let (Some(id), Some(key), Some(secret), Some(cluster)) =
            (id.clone(), key.clone(), secret.clone(), cluster.clone())
        else {
            let missing = [
                (ENV_APP_ID, id.is_none()),
                (ENV_APP_KEY, key.is_none()),
                (ENV_APP_SECRET, secret.is_none()),
                (ENV_APP_CLUSTER, cluster.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return ConfigState::Degraded(missing);
        };

        let mut credentials = AppCredentials::new(id, key, secret, cluster);
        if let Some(raw) = read(ENV_ENCRYPTION_MASTER_KEY) {
            match decode_master_key(&raw) {
                Ok(master_key) => {
                    credentials = credentials.with_encryption_master_key(master_key);
                }
                Err(reason) => warn!(
                    "Ignoring {}: {}. Encrypted channels will be refused.",
                    ENV_ENCRYPTION_MASTER_KEY, reason
                ),
            }
        }

        ConfigState::Ready(credentials)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ConfigState::Ready(_))
    }
}

fn decode_master_key(raw: &str) -> Result<[u8; ENCRYPTION_MASTER_KEY_LENGTH], String> {
    let bytes = STANDARD
        .decode(raw)
        .map_err(|e| format!("not valid base64 ({})", e))?;
    let length = bytes.len();
    bytes.try_into().map_err(|_| {
        format!(
            "decoded to {} bytes, expected {}",
            length, ENCRYPTION_MASTER_KEY_LENGTH
        )
    })
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub credentials: bool,
    pub origin: OriginPolicy,
    pub methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            credentials: true,
            origin: OriginPolicy::AllowAll,
            methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec![
                "Authorization".to_string(),
                "Content-Type".to_string(),
                "X-Requested-With".to_string(),
                "Accept".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub shutdown_grace_period: u64,
    pub cors: CorsConfig,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            shutdown_grace_period: 0,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read ahead of the full options so logging is up before anything warns.
    pub fn debug_from_env() -> bool {
        Self::debug_from_lookup(|name| std::env::var(name).ok())
    }

    pub fn debug_from_lookup<F>(lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(ENV_DEBUG).is_some_and(|val| parse_bool(val.trim()))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = ServerOptions {
            debug: Self::debug_from_lookup(&lookup),
            ..ServerOptions::default()
        };

        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            options.host = host.trim().to_string();
        }
        if let Some(port_str) = lookup(ENV_PORT) {
            match port_str.trim().parse() {
                Ok(port) => options.port = port,
                Err(_) => eprintln!(
                    "[CONFIG-WARN] Failed to parse PORT env var: '{}'. Using default: {}.",
                    port_str, DEFAULT_PORT
                ),
            }
        }
        if let Some(val) = lookup(ENV_SHUTDOWN_GRACE_PERIOD) {
            match val.trim().parse() {
                Ok(seconds) => options.shutdown_grace_period = seconds,
                Err(_) => eprintln!(
                    "[CONFIG-WARN] Failed to parse SHUTDOWN_GRACE_PERIOD env var: '{}'",
                    val
                ),
            }
        }

        options.cors.origin = OriginPolicy::parse(lookup(ENV_ALLOWED_ORIGINS).as_deref());
        options
    }
}

fn parse_bool(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}
