//! AES encryption of byte buffers, strings and whole files.

use super::{DEFAULT_KEY_SIZE, ENCRYPTED_SUFFIX, IV_LEN, keystore::KeyStore, supplier};
use crate::error::{CryptoError, Result};
use crate::storage::Storage;
use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{
    BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit,
    block_padding::{AnsiX923, Iso10126, NoPadding, Pkcs7, ZeroPadding},
};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

/// How the final block is filled before encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingMode {
    /// Input must already be a multiple of the block size.
    None,
    #[default]
    Pkcs7,
    /// Zero bytes; trailing zeros of the plaintext are lost on decrypt.
    Zeros,
    AnsiX923,
    Iso10126,
}

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherMode {
    #[default]
    Cbc,
    /// Ignores the IV.
    Ecb,
}

impl FromStr for PaddingMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PaddingMode::None),
            "pkcs7" => Ok(PaddingMode::Pkcs7),
            "zeros" => Ok(PaddingMode::Zeros),
            "ansix923" => Ok(PaddingMode::AnsiX923),
            "iso10126" => Ok(PaddingMode::Iso10126),
            _ => Err(CryptoError::invalid(format!("unknown padding mode '{s}'"))),
        }
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cbc" => Ok(CipherMode::Cbc),
            "ecb" => Ok(CipherMode::Ecb),
            _ => Err(CryptoError::invalid(format!("unknown cipher mode '{s}'"))),
        }
    }
}

/// AES with a fixed key, IV, padding and mode.
///
/// Every call is independent: the configured IV is reused for each
/// encryption and nothing chains between calls. Key and IV are zeroized by
/// [`AesCipher::release`] or on drop.
#[derive(Clone)]
pub struct AesCipher {
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
    key_size: usize,
    padding: PaddingMode,
    mode: CipherMode,
    released: bool,
}

impl fmt::Debug for AesCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCipher")
            .field("key_size", &self.key_size)
            .field("padding", &self.padding)
            .field("mode", &self.mode)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for AesCipher {
    fn drop(&mut self) {
        self.release();
    }
}

impl AesCipher {
    /// 256-bit random key, random IV, PKCS7, CBC.
    pub fn new() -> Result<Self> {
        let key = supplier::generate_key(DEFAULT_KEY_SIZE)?;
        Self::with_key(DEFAULT_KEY_SIZE, &key)
    }

    /// Given key with a random IV.
    pub fn with_key(key_size: usize, key: &[u8]) -> Result<Self> {
        let iv = Zeroizing::new(supplier::generate_iv()?);
        Self::with_key_iv(key_size, key, iv.as_slice())
    }

    pub fn with_key_iv(key_size: usize, key: &[u8], iv: &[u8]) -> Result<Self> {
        Self::with_options(key_size, key, iv, PaddingMode::default(), CipherMode::default())
    }

    pub fn from_key_store(store: &KeyStore) -> Result<Self> {
        Self::with_key_iv(store.key_size(), store.key(), store.iv())
    }

    pub fn with_padding(key_size: usize, key: &[u8], iv: &[u8], padding: PaddingMode) -> Result<Self> {
        Self::with_options(key_size, key, iv, padding, CipherMode::default())
    }

    pub fn with_mode(key_size: usize, key: &[u8], iv: &[u8], mode: CipherMode) -> Result<Self> {
        Self::with_options(key_size, key, iv, PaddingMode::default(), mode)
    }

    /// Every other constructor ends here.
    ///
    /// Only the key size and emptiness are checked; a key or IV of the wrong
    /// length is reported by the first encrypt/decrypt call.
    pub fn with_options(
        key_size: usize,
        key: &[u8],
        iv: &[u8],
        padding: PaddingMode,
        mode: CipherMode,
    ) -> Result<Self> {
        if !supplier::is_valid_key_size(key_size) {
            return Err(CryptoError::invalid(format!(
                "{key_size} is not a valid AES key size"
            )));
        }
        if key.is_empty() {
            return Err(CryptoError::invalid("key is empty"));
        }
        if iv.is_empty() {
            return Err(CryptoError::invalid("iv is empty"));
        }

        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            iv: Zeroizing::new(iv.to_vec()),
            key_size,
            padding,
            mode,
            released: false,
        })
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Zeroizes and clears key and IV. Calling it again does nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.key.zeroize();
        self.iv.zeroize();
        self.released = true;
    }

    /// Encrypts the UTF-8 bytes of `plaintext`.
    pub fn encrypt_string_to_bytes(&self, plaintext: &str) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(CryptoError::invalid("plaintext is empty"));
        }
        self.encrypt_bytes(plaintext.as_bytes())
    }

    /// Decrypts `cipher` and interprets the result as UTF-8.
    pub fn decrypt_bytes_to_string(&self, cipher: &[u8]) -> Result<String> {
        let plain = Zeroizing::new(self.decrypt_bytes(cipher)?);
        String::from_utf8(plain.to_vec())
            .map_err(|_| CryptoError::crypto("decrypted data is not valid UTF-8"))
    }

    pub fn encrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(CryptoError::invalid("data is empty"));
        }
        self.ensure_live()?;

        match self.key_size {
            128 => encrypt_with::<Aes128>(self, data),
            192 => encrypt_with::<Aes192>(self, data),
            _ => encrypt_with::<Aes256>(self, data),
        }
    }

    pub fn decrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(CryptoError::invalid("data is empty"));
        }
        self.ensure_live()?;

        match self.key_size {
            128 => decrypt_with::<Aes128>(self, data),
            192 => decrypt_with::<Aes192>(self, data),
            _ => decrypt_with::<Aes256>(self, data),
        }
    }

    /// Encrypts the file at `path` into `<path>.enc` and returns the new path.
    ///
    /// The source file is left untouched.
    pub fn encrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = checked_file(path.as_ref())?;

        let plain = Zeroizing::new(Storage::new(path).load()?);
        let encrypted = self.encrypt_bytes(&plain)?;

        let mut out = OsString::from(path.as_os_str());
        out.push(ENCRYPTED_SUFFIX);
        let out = PathBuf::from(out);

        Storage::new(out.clone()).save(&encrypted)?;
        tracing::debug!(from = %path.display(), to = %out.display(), "file encrypted");
        Ok(out)
    }

    /// Decrypts `<name>.enc` into `<name>` and returns the new path.
    ///
    /// Only a trailing `.enc` is removed; paths without it are rejected.
    pub fn decrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = checked_file(path.as_ref())?;

        let out = path
            .to_str()
            .and_then(|s| s.strip_suffix(ENCRYPTED_SUFFIX))
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                CryptoError::invalid(format!(
                    "{} does not end with '{ENCRYPTED_SUFFIX}'",
                    path.display()
                ))
            })?;

        let encrypted = Storage::new(path).load()?;
        let plain = Zeroizing::new(self.decrypt_bytes(&encrypted)?);

        Storage::new(out.clone()).save(&plain)?;
        tracing::debug!(from = %path.display(), to = %out.display(), "file decrypted");
        Ok(out)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            return Err(CryptoError::invalid("cipher has been released"));
        }
        Ok(())
    }
}

fn checked_file(path: &Path) -> Result<&Path> {
    if path.as_os_str().is_empty() {
        return Err(CryptoError::invalid("path is empty"));
    }
    if !path.is_file() {
        return Err(CryptoError::NotFound(path.to_path_buf()));
    }
    Ok(path)
}

fn encrypt_with<A>(cfg: &AesCipher, data: &[u8]) -> Result<Vec<u8>>
where
    A: BlockCipher + BlockEncryptMut + KeyInit,
{
    match cfg.mode {
        CipherMode::Cbc => {
            check_iv(&cfg.iv)?;
            let enc = cbc::Encryptor::<A>::new_from_slices(&cfg.key, &cfg.iv)
                .map_err(|_| key_length_error(cfg))?;
            pad_and_encrypt(enc, cfg.padding, data)
        }
        CipherMode::Ecb => {
            let enc = ecb::Encryptor::<A>::new_from_slice(&cfg.key).map_err(|_| key_length_error(cfg))?;
            pad_and_encrypt(enc, cfg.padding, data)
        }
    }
}

fn decrypt_with<A>(cfg: &AesCipher, data: &[u8]) -> Result<Vec<u8>>
where
    A: BlockCipher + BlockDecryptMut + KeyInit,
{
    match cfg.mode {
        CipherMode::Cbc => {
            check_iv(&cfg.iv)?;
            let dec = cbc::Decryptor::<A>::new_from_slices(&cfg.key, &cfg.iv)
                .map_err(|_| key_length_error(cfg))?;
            decrypt_and_unpad(dec, cfg.padding, data)
        }
        CipherMode::Ecb => {
            let dec = ecb::Decryptor::<A>::new_from_slice(&cfg.key).map_err(|_| key_length_error(cfg))?;
            decrypt_and_unpad(dec, cfg.padding, data)
        }
    }
}

fn pad_and_encrypt<C: BlockEncryptMut>(cipher: C, padding: PaddingMode, data: &[u8]) -> Result<Vec<u8>> {
    Ok(match padding {
        PaddingMode::None => {
            if data.len() % IV_LEN != 0 {
                return Err(CryptoError::crypto(format!(
                    "input of {} bytes is not a multiple of the block size without padding",
                    data.len()
                )));
            }
            cipher.encrypt_padded_vec_mut::<NoPadding>(data)
        }
        PaddingMode::Pkcs7 => cipher.encrypt_padded_vec_mut::<Pkcs7>(data),
        PaddingMode::Zeros => cipher.encrypt_padded_vec_mut::<ZeroPadding>(data),
        PaddingMode::AnsiX923 => cipher.encrypt_padded_vec_mut::<AnsiX923>(data),
        PaddingMode::Iso10126 => cipher.encrypt_padded_vec_mut::<Iso10126>(data),
    })
}

fn decrypt_and_unpad<C: BlockDecryptMut>(cipher: C, padding: PaddingMode, data: &[u8]) -> Result<Vec<u8>> {
    let result = match padding {
        PaddingMode::None => cipher.decrypt_padded_vec_mut::<NoPadding>(data),
        PaddingMode::Pkcs7 => cipher.decrypt_padded_vec_mut::<Pkcs7>(data),
        PaddingMode::Zeros => cipher.decrypt_padded_vec_mut::<ZeroPadding>(data),
        PaddingMode::AnsiX923 => cipher.decrypt_padded_vec_mut::<AnsiX923>(data),
        PaddingMode::Iso10126 => cipher.decrypt_padded_vec_mut::<Iso10126>(data),
    };
    result.map_err(|_| CryptoError::crypto("invalid padding or corrupted data"))
}

fn check_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != IV_LEN {
        return Err(CryptoError::crypto(format!(
            "iv is {} bytes, CBC needs {IV_LEN}",
            iv.len()
        )));
    }
    Ok(())
}

fn key_length_error(cfg: &AesCipher) -> CryptoError {
    CryptoError::crypto(format!(
        "key is {} bytes, {}-bit AES needs {}",
        cfg.key.len(),
        cfg.key_size,
        cfg.key_size / 8
    ))
}
