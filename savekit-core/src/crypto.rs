//! Symmetric encryption of save file payloads.
//!
//! The passphrase and salt from the configuration are never used as a cipher
//! key directly. HKDF-SHA256 turns them into a 256-bit [`FileKey`], which seals
//! payloads with XChaCha20-Poly1305.
//!
//! Envelope layout:
//!
//! ```text
//! [version: u8][nonce: 24 bytes][ciphertext || 16-byte tag]
//! ```
//!
//! This protects saves against casual inspection and tampering. It is not a
//! hardened boundary: HKDF does not slow down passphrase guessing.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{SaveLoadError, SaveLoadResult};

const ENVELOPE_VERSION: u8 = 1;
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;
const HEADER_SIZE: usize = 1 + NONCE_SIZE;
const KEY_INFO: &[u8] = b"savekit:save-file-key";
const SAVE_FILE_AD: &[u8] = b"savekit:save-file";

/// Cipher key derived from a passphrase and salt (256-bit).
///
/// Zeroized on drop; never logged.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileKey([u8; 32]);

impl FileKey {
    /// Derives the key with HKDF-SHA256.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Encryption`] if the derivation cannot produce
    /// a full-length key.
    pub fn derive(passphrase: &str, salt: &str) -> SaveLoadResult<Self> {
        let hk = Hkdf::<Sha256>::new(Some(salt.as_bytes()), passphrase.as_bytes());
        let mut key = [0u8; 32];
        hk.expand(KEY_INFO, &mut key)
            .map_err(|err| SaveLoadError::Encryption(format!("key derivation failed: {err}")))?;
        Ok(Self(key))
    }

    const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Encrypts and decrypts whole save payloads under one derived key.
#[derive(Debug, Clone)]
pub struct EncryptionCodec {
    key: FileKey,
}

impl EncryptionCodec {
    /// Builds a codec from an already derived key.
    #[must_use]
    pub const fn new(key: FileKey) -> Self {
        Self { key }
    }

    /// Derives the key from `passphrase` and `salt` and builds a codec.
    ///
    /// # Errors
    ///
    /// See [`FileKey::derive`].
    pub fn from_passphrase(passphrase: &str, salt: &str) -> SaveLoadResult<Self> {
        FileKey::derive(passphrase, salt).map(Self::new)
    }

    fn cipher(&self) -> SaveLoadResult<XChaCha20Poly1305> {
        XChaCha20Poly1305::new_from_slice(self.key.as_bytes())
            .map_err(|_| SaveLoadError::Encryption("invalid key length".to_string()))
    }

    /// Seals `plaintext` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Encryption`] if the AEAD refuses the input.
    pub fn encrypt(&self, plaintext: &[u8]) -> SaveLoadResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(
                XNonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: SAVE_FILE_AD,
                },
            )
            .map_err(|_| {
                SaveLoadError::Encryption("XChaCha20-Poly1305 encryption failed".to_string())
            })?;

        let mut out = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        out.push(ENVELOPE_VERSION);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Opens an envelope produced by [`Self::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`SaveLoadError::Decryption`] if the envelope is truncated, has an
    /// unknown version, or fails authentication (wrong key or tampered bytes).
    pub fn decrypt(&self, envelope: &[u8]) -> SaveLoadResult<Vec<u8>> {
        if envelope.len() < HEADER_SIZE + TAG_SIZE {
            return Err(SaveLoadError::Decryption(format!(
                "ciphertext too short: {} bytes",
                envelope.len()
            )));
        }
        let (header, ciphertext) = envelope.split_at(HEADER_SIZE);
        let (version, nonce_bytes) = header.split_at(1);
        if version[0] != ENVELOPE_VERSION {
            return Err(SaveLoadError::Decryption(format!(
                "unsupported envelope version: {}",
                version[0]
            )));
        }

        self.cipher()?
            .decrypt(
                XNonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: SAVE_FILE_AD,
                },
            )
            .map_err(|_| {
                SaveLoadError::Decryption(
                    "authentication failed (wrong key or corrupted data)".to_string(),
                )
            })
    }
}

/// Encrypts `bytes` under the key derived from `key` and `salt`.
///
/// # Errors
///
/// See [`EncryptionCodec::encrypt`].
pub fn encrypt(bytes: &[u8], key: &str, salt: &str) -> SaveLoadResult<Vec<u8>> {
    EncryptionCodec::from_passphrase(key, salt)?.encrypt(bytes)
}

/// Decrypts `ciphertext` under the key derived from `key` and `salt`.
///
/// # Errors
///
/// See [`EncryptionCodec::decrypt`].
pub fn decrypt(ciphertext: &[u8], key: &str, salt: &str) -> SaveLoadResult<Vec<u8>> {
    EncryptionCodec::from_passphrase(key, salt)?.decrypt(ciphertext)
}
