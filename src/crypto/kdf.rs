use crate::crypto::hash::HashFunction;
use crate::error::{CryptoError, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

/// Length of keys produced by [`derive_key_argon2`] (32 bytes / 256 bits).
pub const ARGON2_KEY_LEN: usize = 32;

/// Derives key material with the iterated-hash chain used by existing key files.
///
/// `h0 = H(passphrase)`, then `buf = H(h0 || salt)`, then `buf = H(buf)`
/// another `iterations - 1` times. The output length is the digest length of
/// `function`. This is not a vetted password KDF: the salt enters only once
/// and no HMAC is involved. Prefer [`derive_key_argon2`] for new keys.
pub fn derive_key(
    passphrase: &str,
    salt: &[u8],
    function: HashFunction,
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>> {
    if passphrase.is_empty() {
        return Err(CryptoError::invalid("passphrase is empty"));
    }
    if salt.is_empty() {
        return Err(CryptoError::invalid("salt is empty"));
    }
    if iterations == 0 {
        return Err(CryptoError::invalid("iterations must be >= 1"));
    }

    let hashed = Zeroizing::new(function.digest(passphrase.as_bytes())?);

    let mut data = Zeroizing::new(Vec::with_capacity(hashed.len() + salt.len()));
    data.extend_from_slice(&hashed);
    data.extend_from_slice(salt);

    let mut buf = Zeroizing::new(function.digest(&data)?);
    for _ in 1..iterations {
        buf = Zeroizing::new(function.digest(&buf)?);
    }

    Ok(buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    mem_cost_kib: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            mem_cost_kib: 64 * 1024, // 64 MiB
            time_cost: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    pub fn new(mem_cost_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self> {
        let params = Self {
            mem_cost_kib,
            time_cost,
            parallelism,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn mem_cost_kib(&self) -> u32 {
        self.mem_cost_kib
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_cost < 1 {
            return Err(CryptoError::invalid("argon2 time cost must be >= 1"));
        }
        if self.parallelism < 1 {
            return Err(CryptoError::invalid("argon2 parallelism must be >= 1"));
        }
        if self.mem_cost_kib < 8 * self.parallelism {
            return Err(CryptoError::invalid(
                "argon2 memory cost must be at least 8 * parallelism",
            ));
        }
        Ok(())
    }
}

/// Derives a 256-bit key with Argon2id (v0x13).
pub fn derive_key_argon2(
    passphrase: &str,
    salt: &[u8],
    kdf: KdfParams,
) -> Result<Zeroizing<[u8; ARGON2_KEY_LEN]>> {
    if passphrase.is_empty() {
        return Err(CryptoError::invalid("passphrase is empty"));
    }
    kdf.validate()?;

    let params = Params::new(
        kdf.mem_cost_kib,
        kdf.time_cost,
        kdf.parallelism,
        Some(ARGON2_KEY_LEN),
    )
    .map_err(|e| CryptoError::invalid(format!("argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; ARGON2_KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|e| CryptoError::crypto(format!("argon2 key derivation failed: {e}")))?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_is_deterministic() {
        let k1 = derive_key("correct horse", &[1, 2, 3, 4], HashFunction::Sha256, 1000).unwrap();
        let k2 = derive_key("correct horse", &[1, 2, 3, 4], HashFunction::Sha256, 1000).unwrap();

        assert_eq!(k1.len(), 32);
        assert_eq!(k1, k2);
    }

    #[test]
    fn every_input_affects_output() {
        let base = derive_key("correct horse", &[1, 2, 3, 4], HashFunction::Sha256, 1000).unwrap();

        let salt = derive_key("correct horse", &[1, 2, 3, 5], HashFunction::Sha256, 1000).unwrap();
        let pass = derive_key("correct horsf", &[1, 2, 3, 4], HashFunction::Sha256, 1000).unwrap();
        let iters = derive_key("correct horse", &[1, 2, 3, 4], HashFunction::Sha256, 999).unwrap();
        let func = derive_key("correct horse", &[1, 2, 3, 4], HashFunction::Sha512, 1000).unwrap();

        assert_ne!(base, salt);
        assert_ne!(base, pass);
        assert_ne!(base, iters);
        assert_eq!(func.len(), 64);
    }

    #[test]
    fn single_iteration_is_one_round_after_concatenation() {
        let f = HashFunction::Sha1;
        let mut data = f.digest(b"pw").unwrap();
        data.extend_from_slice(&[9, 9]);
        let expected = f.digest(&data).unwrap();

        let derived = derive_key("pw", &[9, 9], f, 1).unwrap();
        assert_eq!(*derived, expected);

        let twice = derive_key("pw", &[9, 9], f, 2).unwrap();
        assert_eq!(*twice, f.digest(&expected).unwrap());
    }

    #[test]
    fn hash_comes_before_salt() {
        let f = HashFunction::Md5;
        let mut reversed = vec![7u8, 7];
        reversed.extend_from_slice(&f.digest(b"pw").unwrap());

        let derived = derive_key("pw", &[7, 7], f, 1).unwrap();
        assert_ne!(*derived, f.digest(&reversed).unwrap());
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let f = HashFunction::Sha256;
        assert!(matches!(derive_key("", &[1], f, 1), Err(CryptoError::InvalidArgument(_))));
        assert!(matches!(derive_key("pw", &[], f, 1), Err(CryptoError::InvalidArgument(_))));
        assert!(matches!(derive_key("pw", &[1], f, 0), Err(CryptoError::InvalidArgument(_))));
    }

    #[test]
    fn argon2_is_deterministic() {
        let kdf = KdfParams::new(1024, 1, 1).unwrap();
        let salt = [42u8; 16];

        let k1 = derive_key_argon2("password", &salt, kdf).unwrap();
        let k2 = derive_key_argon2("password", &salt, kdf).unwrap();

        assert_eq!(*k1, *k2);
    }

    #[test]
    fn argon2_params_affect_output() {
        let salt = [7u8; 16];
        let k1 = derive_key_argon2("pw", &salt, KdfParams::new(1024, 1, 1).unwrap()).unwrap();
        let k2 = derive_key_argon2("pw", &salt, KdfParams::new(2048, 1, 1).unwrap()).unwrap();

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn argon2_invalid_params_fail_gracefully() {
        assert!(KdfParams::new(0, 0, 0).is_err());
        assert!(KdfParams::new(8, 1, 2).is_err());
    }
}
