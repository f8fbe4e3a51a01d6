//! Key and IV generation, and persistence of key stores.
//!
//! Persisting and loading key stores never propagate I/O or parse errors:
//! they write an error record next to the key store and return `None`.

use super::{IV_LEN, KEYSTORE_SUFFIX, VALID_KEY_SIZES, keystore::KeyStore};
use crate::error::{CryptoError, Result};
use crate::error_log::write_error_log;
use crate::storage::{self, directory_of};
use getrandom::fill;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

const LOG_CONTEXT: &str = "aesnest::crypto::supplier";

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| CryptoError::crypto(format!("OS random generator unavailable: {e}")))
}

/// Returns `true` for 128, 192 and 256.
pub fn is_valid_key_size(bits: usize) -> bool {
    VALID_KEY_SIZES.contains(&bits)
}

/// Generates a random AES key of `bits` bits.
pub fn generate_key(bits: usize) -> Result<Zeroizing<Vec<u8>>> {
    if !is_valid_key_size(bits) {
        return Err(CryptoError::invalid(format!(
            "{bits} is not a valid AES key size"
        )));
    }

    let mut key = Zeroizing::new(vec![0u8; bits / 8]);
    secure_random(&mut key)?;
    Ok(key)
}

/// Generates a random 16-byte IV.
pub fn generate_iv() -> Result<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    secure_random(&mut iv)?;
    Ok(iv)
}

/// `path` with `.keystore` appended.
pub fn key_store_path(path: impl AsRef<Path>) -> PathBuf {
    let mut s = OsString::from(path.as_ref().as_os_str());
    s.push(KEYSTORE_SUFFIX);
    PathBuf::from(s)
}

/// Writes `key`, `bits` and `iv` to `<path>.keystore` and returns the store.
///
/// Any failure, invalid arguments included, is logged into the directory of
/// `path` and turned into `None`.
pub fn persist_key_store(key: &[u8], bits: usize, iv: &[u8], path: impl AsRef<Path>) -> Option<KeyStore> {
    let path = path.as_ref();
    let target = key_store_path(path);

    let result = KeyStore::new(key.to_vec(), bits, iv).and_then(|store| {
        storage::write_lines(&store.to_lines(), &target)?;
        Ok(store)
    });

    match result {
        Ok(store) => {
            tracing::debug!(path = %target.display(), bits, "key store written");
            Some(store)
        }
        Err(e) => {
            write_error_log(&log_dir(path), &e, LOG_CONTEXT);
            None
        }
    }
}

/// Generates a key and IV, persists them to `<path>.keystore` and returns the store.
///
/// # Errors
///
/// An invalid key size is reported as [`CryptoError::InvalidArgument`]
/// before anything is written. Write failures produce `Ok(None)`.
pub fn generate_and_persist_key_store(bits: usize, path: impl AsRef<Path>) -> Result<Option<KeyStore>> {
    let key = generate_key(bits)?;
    let iv = generate_iv()?;
    Ok(persist_key_store(&key, bits, &iv, path))
}

/// Reads a key store written by [`persist_key_store`].
///
/// # Errors
///
/// [`CryptoError::NotFound`] if `path` does not exist. Read and parse
/// failures are logged and produce `Ok(None)`.
pub fn load_key_store(path: impl AsRef<Path>) -> Result<Option<KeyStore>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CryptoError::NotFound(path.to_path_buf()));
    }

    match storage::read_lines(path).and_then(|lines| KeyStore::from_lines(&lines)) {
        Ok(store) => {
            tracing::debug!(path = %path.display(), bits = store.key_size(), "key store loaded");
            Ok(Some(store))
        }
        Err(e) => {
            let dir = directory_of(path).unwrap_or_else(|_| log_dir(path));
            write_error_log(&dir, &e, LOG_CONTEXT);
            Ok(None)
        }
    }
}

fn log_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
