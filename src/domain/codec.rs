//! Message obfuscation
//!
//! Messages are XOR-masked against a repeating passphrase and then base64
//! encoded so they can sit in a text file without being readable at a glance.
//!
//! **This is not encryption.** Anyone holding the file and the passphrase
//! (which defaults to a constant compiled into the binary) can recover every
//! message. It only keeps you from spoiling a bottle by accident while
//! looking at the data file.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Passphrase used when the configuration does not provide one
pub const DEFAULT_KEY: &str = "a message in a bottle drifts until it is found";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Obfuscation key must not be empty")]
    EmptyKey,

    #[error("Stored message is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Stored message does not decode to text (was it written with a different key?)")]
    InvalidUtf8,
}

/// Reversible XOR + base64 transform over message text
#[derive(Debug, Clone)]
pub struct Codec {
    key: Vec<u8>,
}

impl Codec {
    /// Creates a codec for the given passphrase
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        let key = key.as_ref().to_vec();
        if key.is_empty() {
            return Err(CodecError::EmptyKey);
        }
        Ok(Self { key })
    }

    /// Masks `plaintext` and returns the base64 token
    pub fn encode(&self, plaintext: &str) -> String {
        general_purpose::STANDARD.encode(self.mask(plaintext.as_bytes()))
    }

    /// Reverses [`Codec::encode`]
    pub fn decode(&self, token: &str) -> Result<String, CodecError> {
        let masked = general_purpose::STANDARD
            .decode(token)
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        String::from_utf8(self.mask(&masked)).map_err(|_| CodecError::InvalidUtf8)
    }

    // XOR is its own inverse, so this serves both directions
    fn mask(&self, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.as_bytes().to_vec(),
        }
    }
}
