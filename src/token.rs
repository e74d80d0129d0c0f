use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Performs a timing-safe comparison of two strings
pub fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// HMAC-SHA256 signer bound to one application key pair.
pub struct Token {
    key: String,
    secret: String,
}

impl Token {
    /// Creates a new Token instance with the given key and secret
    ///
    /// # Arguments
    ///
    /// * `key` - The application key
    /// * `secret` - The application secret used for signing
    pub fn new(key: String, secret: String) -> Self {
        Token { key, secret }
    }

    /// Signs the input string using HMAC-SHA256 with the secret
    ///
    /// # Returns
    ///
    /// Returns the lowercase hexadecimal representation of the HMAC signature
    pub fn sign(&self, input: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::Internal(format!("Failed to initialise HMAC: {}", e)))?;

        mac.update(input.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Produces the `<key>:<signature>` pair clients present when subscribing.
    pub fn auth_string(&self, input: &str) -> Result<String> {
        Ok(format!("{}:{}", self.key, self.sign(input)?))
    }

    /// Verifies if the provided signature matches the computed signature for the input
    pub fn verify(&self, input: &str, signature: &str) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
            return false;
        };

        mac.update(input.as_bytes());

        if let Ok(signature_bytes) = hex::decode(signature) {
            mac.verify_slice(&signature_bytes).is_ok()
        } else {
            false
        }
    }
}
