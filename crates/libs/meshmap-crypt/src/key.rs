use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const KEY_SIZE: usize = 16;

/// Publicly known default PSK of the primary channel.
pub const DEFAULT_CHANNEL_KEY_B64: &str = "1PG7OiApB1nwvP+rz05pAQ==";

const DEFAULT_CHANNEL_KEY: [u8; KEY_SIZE] = [
    0xd4, 0xf1, 0xbb, 0x3a, 0x20, 0x29, 0x07, 0x59, 0xf0, 0xbc, 0xff, 0xab, 0xcf, 0x4e, 0x69, 0x01,
];

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("channel key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("channel key must be {KEY_SIZE} bytes, got {0}")]
    InvalidLength(usize),
}

/// AES-128 channel pre-shared key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelKey([u8; KEY_SIZE]);

impl ChannelKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let key: [u8; KEY_SIZE] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength(bytes.len()))?;
        Ok(Self(key))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let mut decoded = STANDARD.decode(encoded.trim())?;
        let key = Self::from_slice(&decoded);
        decoded.zeroize();
        key
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_CHANNEL_KEY
    }
}

impl Default for ChannelKey {
    fn default() -> Self {
        Self(DEFAULT_CHANNEL_KEY)
    }
}

// Key bytes stay out of logs.
impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("ChannelKey(default)")
        } else {
            f.write_str("ChannelKey(<redacted>)")
        }
    }
}

impl TryFrom<String> for ChannelKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_base64(&value)
    }
}

impl From<ChannelKey> for String {
    fn from(key: ChannelKey) -> Self {
        key.to_base64()
    }
}
