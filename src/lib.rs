//! AES key stores, digests, key derivation and file encryption.
//!
//! A caller obtains a [`KeyStore`] (freshly generated, or loaded from a
//! `.keystore` file), builds an [`AesCipher`] from it and encrypts or
//! decrypts buffers, strings or whole files. [`derive_key`] turns a
//! passphrase into key material with an iterated hash chain.

pub mod crypto;
mod error;
pub mod error_log;
pub mod storage;

pub use crate::crypto::hash::{hash, hash_str};
pub use crate::crypto::supplier::key_store_path;
pub use crate::crypto::{
    AesCipher, CipherMode, HashFunction, KdfParams, KeyStore, PaddingMode, RandomSource,
    derive_key, derive_key_argon2, generate_and_persist_key_store, generate_iv, generate_key,
    is_valid_key_size, load_key_store, persist_key_store,
};
pub use crate::error::{CryptoError, Result};
pub use crate::storage::Storage;
