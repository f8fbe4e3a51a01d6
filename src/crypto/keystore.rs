//! In-memory key store and its three-line text format.
//!
//! ```text
//! <key byte> <key byte> ... <key byte> \n
//! <key size in bits>\n
//! <iv byte> <iv byte> ... <iv byte> \n
//! ```
//!
//! Bytes are decimal, each followed by a single space. There is no header,
//! version or checksum.

use super::{IV_LEN, supplier};
use crate::error::{CryptoError, Result};
use std::fmt;
use zeroize::Zeroizing;

const LINE_COUNT: usize = 3;

/// An AES key, its size in bits and an initialization vector.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyStore {
    key: Zeroizing<Vec<u8>>,
    key_size: usize,
    iv: Zeroizing<[u8; IV_LEN]>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("key_size", &self.key_size)
            .finish_non_exhaustive()
    }
}

impl KeyStore {
    /// Builds a key store from existing material.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidArgument`] if the key or IV is empty, the size is
    /// not an AES key size, the key is not `key_size / 8` bytes or the IV is
    /// not 16 bytes.
    pub fn new(key: impl Into<Vec<u8>>, key_size: usize, iv: &[u8]) -> Result<Self> {
        let key = Zeroizing::new(key.into());

        if key.is_empty() {
            return Err(CryptoError::invalid("key is empty"));
        }
        if iv.is_empty() {
            return Err(CryptoError::invalid("iv is empty"));
        }
        if !supplier::is_valid_key_size(key_size) {
            return Err(CryptoError::invalid(format!(
                "{key_size} is not a valid AES key size"
            )));
        }
        if key.len() != key_size / 8 {
            return Err(CryptoError::invalid(format!(
                "key is {} bytes, expected {} for {key_size}-bit AES",
                key.len(),
                key_size / 8
            )));
        }

        let iv: [u8; IV_LEN] = iv
            .try_into()
            .map_err(|_| CryptoError::invalid(format!("iv must be {IV_LEN} bytes")))?;

        Ok(Self {
            key,
            key_size,
            iv: Zeroizing::new(iv),
        })
    }

    /// Generates a fresh random key of `key_size` bits and a fresh IV.
    pub fn generate(key_size: usize) -> Result<Self> {
        let key = supplier::generate_key(key_size)?;
        let iv = Zeroizing::new(supplier::generate_iv()?);
        Self::new(key.to_vec(), key_size, iv.as_slice())
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// Renders the three lines of the persisted format.
    pub fn to_lines(&self) -> [String; LINE_COUNT] {
        [
            byte_line(&self.key),
            self.key_size.to_string(),
            byte_line(self.iv.as_slice()),
        ]
    }

    /// Parses the three lines of the persisted format.
    ///
    /// The key buffer is sized from the declared key size, so the number of
    /// key bytes must match it exactly.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        if lines.len() != LINE_COUNT {
            return Err(CryptoError::invalid(format!(
                "key store has {} lines, expected {LINE_COUNT}",
                lines.len()
            )));
        }

        let key = Zeroizing::new(parse_bytes(lines[0].as_ref(), "key")?);
        let size_line = lines[1].as_ref().trim();
        let key_size: usize = size_line
            .parse()
            .map_err(|_| CryptoError::invalid(format!("invalid key size '{size_line}'")))?;
        let iv = Zeroizing::new(parse_bytes(lines[2].as_ref(), "iv")?);

        Self::new(key.to_vec(), key_size, &iv)
    }
}

fn byte_line(bytes: &[u8]) -> String {
    let mut line = String::with_capacity(bytes.len() * 4);
    for b in bytes {
        line.push_str(&b.to_string());
        line.push(' ');
    }
    line
}

fn parse_bytes(line: &str, what: &str) -> Result<Vec<u8>> {
    line.split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<u8>()
                .map_err(|_| CryptoError::invalid(format!("invalid {what} byte '{t}'")))
        })
        .collect()
}
