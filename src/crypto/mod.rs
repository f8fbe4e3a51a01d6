//! AES, digest and key-derivation primitives.
//!
//! Provides the key store and its on-disk format, the AES cipher wrapper,
//! hashing, key derivation and a non-cryptographic PRNG.

pub mod cipher;
pub mod hash;
pub mod kdf;
pub mod keystore;
pub mod random;
pub mod supplier;

pub use cipher::{AesCipher, CipherMode, PaddingMode};
pub use hash::HashFunction;
pub use kdf::{KdfParams, derive_key, derive_key_argon2};
pub use keystore::KeyStore;
pub use random::RandomSource;
pub use supplier::{
    generate_and_persist_key_store, generate_iv, generate_key, is_valid_key_size,
    load_key_store, persist_key_store,
};

/// AES block length, and therefore IV length (16 bytes).
pub const BLOCK_LEN: usize = 16;
/// Length of the initialization vector (16 bytes).
pub const IV_LEN: usize = BLOCK_LEN;
/// Key sizes, in bits, accepted by AES.
pub const VALID_KEY_SIZES: [usize; 3] = [128, 192, 256];
/// Key size used when none is given.
pub const DEFAULT_KEY_SIZE: usize = 256;
/// Suffix appended by [`AesCipher::encrypt_file`].
pub const ENCRYPTED_SUFFIX: &str = ".enc";
/// Suffix appended to key-store paths.
pub const KEYSTORE_SUFFIX: &str = ".keystore";
