use crate::error::{CryptoError, Result};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Digest functions usable for hashing and key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    pub const ALL: [HashFunction; 5] = [
        HashFunction::Md5,
        HashFunction::Sha1,
        HashFunction::Sha256,
        HashFunction::Sha384,
        HashFunction::Sha512,
    ];

    /// Hashes `input` with this function. Empty input is rejected.
    pub fn digest(self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() {
            return Err(CryptoError::invalid("hash input is empty"));
        }

        Ok(match self {
            HashFunction::Md5 => Md5::digest(input).to_vec(),
            HashFunction::Sha1 => Sha1::digest(input).to_vec(),
            HashFunction::Sha256 => Sha256::digest(input).to_vec(),
            HashFunction::Sha384 => Sha384::digest(input).to_vec(),
            HashFunction::Sha512 => Sha512::digest(input).to_vec(),
        })
    }

    /// Output size in bits.
    pub fn bit_size(self) -> usize {
        match self {
            HashFunction::Md5 => 128,
            HashFunction::Sha1 => 160,
            HashFunction::Sha256 => 256,
            HashFunction::Sha384 => 384,
            HashFunction::Sha512 => 512,
        }
    }

    /// Output size in bytes.
    pub fn output_len(self) -> usize {
        self.bit_size() / 8
    }

    pub fn name(self) -> &'static str {
        match self {
            HashFunction::Md5 => "md5",
            HashFunction::Sha1 => "sha1",
            HashFunction::Sha256 => "sha256",
            HashFunction::Sha384 => "sha384",
            HashFunction::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashFunction {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(HashFunction::Md5),
            // "sha128" is the historical label for SHA-1
            "sha1" | "sha128" => Ok(HashFunction::Sha1),
            "sha256" => Ok(HashFunction::Sha256),
            "sha384" => Ok(HashFunction::Sha384),
            "sha512" => Ok(HashFunction::Sha512),
            _ => Err(CryptoError::invalid(format!("unknown hash function '{s}'"))),
        }
    }
}

/// Hashes `input` with `function`.
pub fn hash(function: HashFunction, input: &[u8]) -> Result<Vec<u8>> {
    function.digest(input)
}

/// Hashes the UTF-8 bytes of `input` and returns uppercase hex without separators.
///
/// Empty and whitespace-only strings are rejected.
pub fn hash_str(function: HashFunction, input: &str) -> Result<String> {
    if input.trim().is_empty() {
        return Err(CryptoError::invalid("hash input is empty or whitespace"));
    }
    Ok(hex::encode_upper(function.digest(input.as_bytes())?))
}

pub fn md5(input: &[u8]) -> Result<Vec<u8>> {
    hash(HashFunction::Md5, input)
}

pub fn sha1(input: &[u8]) -> Result<Vec<u8>> {
    hash(HashFunction::Sha1, input)
}

pub fn sha256(input: &[u8]) -> Result<Vec<u8>> {
    hash(HashFunction::Sha256, input)
}

pub fn sha384(input: &[u8]) -> Result<Vec<u8>> {
    hash(HashFunction::Sha384, input)
}

pub fn sha512(input: &[u8]) -> Result<Vec<u8>> {
    hash(HashFunction::Sha512, input)
}
