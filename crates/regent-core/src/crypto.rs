// ── Field encryption engine ──
//
// Per-instance field cipher used by every entity pair. Each encrypted
// entity carries its own `CryptoParams`: a random salt from which the
// field key is derived (HKDF-SHA256 over the master key) and a sealed
// check marker so a wrong master key is rejected before any field is
// touched.
//
// Sealed field format: base64( nonce (12 bytes) || ciphertext || tag (16 bytes) )

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit},
};
use hkdf::Hkdf;
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::model::pair::{SecureEntity, Transform};

/// Algorithm identifier written into every `CryptoParams`.
pub const ALGORITHM: &str = "chacha20poly1305+hkdf-sha256";

const SALT_SIZE: usize = 16;
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const HKDF_INFO: &[u8] = b"regent-field-cipher-v1";
const CHECK_MARKER: &[u8] = b"regent-key-check";

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("decryption failed: wrong key or tampered ciphertext")]
    WrongKey,

    #[error("malformed ciphertext: {reason}")]
    Malformed { reason: String },

    #[error("unsupported crypto algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("field serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("encryption failed")]
    Encryption,
}

// ── Key material ────────────────────────────────────────────────────

/// Master key material supplied by the caller (passphrase or raw key).
pub struct MasterKey(SecretString);

impl MasterKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

impl From<SecretString> for MasterKey {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

// ── Per-instance parameters ─────────────────────────────────────────

/// How one secure entity was encrypted. Persisted next to the
/// encrypted fields as `cryptoParams`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoParams {
    pub algorithm: String,
    /// Base64 HKDF salt.
    pub salt: String,
    /// Sealed check marker.
    pub check: String,
}

// ── Field cipher ────────────────────────────────────────────────────

/// Cipher bound to one entity instance.
pub struct FieldCipher {
    cipher: ChaCha20Poly1305,
}

impl FieldCipher {
    /// Fresh salt, derived key and the params describing them.
    pub fn generate(key: &MasterKey) -> Result<(Self, CryptoParams), CryptoError> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let cipher = Self::derive(key, &salt)?;
        let check = cipher.seal_bytes(CHECK_MARKER)?;

        let params = CryptoParams {
            algorithm: ALGORITHM.to_owned(),
            salt: BASE64.encode(salt),
            check,
        };
        Ok((cipher, params))
    }

    /// Rebuild the cipher an instance was sealed with, verifying the key.
    pub fn for_params(key: &MasterKey, params: &CryptoParams) -> Result<Self, CryptoError> {
        if params.algorithm != ALGORITHM {
            return Err(CryptoError::UnsupportedAlgorithm(params.algorithm.clone()));
        }

        let salt = BASE64
            .decode(&params.salt)
            .map_err(|e| CryptoError::Malformed {
                reason: format!("salt: {e}"),
            })?;
        let cipher = Self::derive(key, &salt)?;

        let marker = Zeroizing::new(cipher.open_bytes(&params.check)?);
        if marker.as_slice() != CHECK_MARKER {
            return Err(CryptoError::WrongKey);
        }
        Ok(cipher)
    }

    fn derive(key: &MasterKey, salt: &[u8]) -> Result<Self, CryptoError> {
        let hk = Hkdf::<Sha256>::new(Some(salt), key.as_bytes());
        let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
        hk.expand(HKDF_INFO, okm.as_mut_slice())
            .map_err(|_| CryptoError::KeyDerivation)?;

        let cipher = ChaCha20Poly1305::new_from_slice(okm.as_slice())
            .map_err(|_| CryptoError::KeyDerivation)?;
        Ok(Self { cipher })
    }

    /// Serialize `value` to JSON and seal it.
    pub fn seal<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CryptoError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(value)?);
        self.seal_bytes(&plaintext)
    }

    /// Open a sealed field and deserialize it back to `T`.
    pub fn open<T: DeserializeOwned>(&self, sealed: &str) -> Result<T, CryptoError> {
        let plaintext = Zeroizing::new(self.open_bytes(sealed)?);
        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn seal_bytes(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::Encryption)?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(framed))
    }

    fn open_bytes(&self, sealed: &str) -> Result<Vec<u8>, CryptoError> {
        let framed = BASE64.decode(sealed).map_err(|e| CryptoError::Malformed {
            reason: e.to_string(),
        })?;
        if framed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Malformed {
                reason: format!("{} bytes is shorter than nonce and tag", framed.len()),
            });
        }

        let (nonce, ciphertext) = framed.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::WrongKey)
    }
}

// ── Transformer ─────────────────────────────────────────────────────

/// Encrypter/decrypter bound to one master key.
///
/// Drives any entity pair in either direction; the pair's own
/// declaration tells it which fields to seal.
#[derive(Debug)]
pub struct Transformer {
    key: MasterKey,
}

impl Transformer {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    pub fn encrypt<T: Transform>(&self, plain: &T) -> Result<T::Secure, CryptoError> {
        plain.encrypt(&self.key)
    }

    pub fn decrypt<S: SecureEntity>(&self, secure: &S) -> Result<S::Plain, CryptoError> {
        secure.decrypt(&self.key)
    }
}
