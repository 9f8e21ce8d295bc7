//! Authenticated symmetric envelopes (AES-256-GCM).
//!
//! An envelope bundles the ciphertext (with its 16-byte tag appended), the
//! 12-byte nonce, and the KDF salt. The salt is bound as associated data, so
//! flipping any bit of ciphertext, nonce or salt makes [`open`] fail.
//!
//! Nonces are always drawn inside [`seal`]; there is no API that accepts one.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::credential::Credential;
use super::kdf::{derive, DerivedKey, Salt};
use crate::error::{Result, VaultError};

/// Nonce length in bytes (96-bit GCM nonce).
pub const IV_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Self-contained encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Ciphertext with the GCM tag appended
    #[serde(with = "crate::encoding::b64")]
    pub ciphertext: Vec<u8>,

    /// Per-encryption random nonce
    #[serde(with = "crate::encoding::b64_array")]
    pub iv: [u8; IV_LEN],

    /// Salt the envelope key was derived with
    #[serde(with = "crate::encoding::b64_array")]
    pub salt: Salt,
}

impl EncryptedEnvelope {
    /// Serialize as the JSON object `{ciphertext, iv, salt}`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON object `{ciphertext, iv, salt}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Invalid AES key: {}", e)))
}

fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal(plaintext: &[u8], key: &DerivedKey) -> Result<EncryptedEnvelope> {
    let cipher = cipher_for(key)?;
    let iv = generate_iv();
    let salt = *key.salt();

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad: &salt,
            },
        )
        .map_err(|_| VaultError::Crypto("AES-GCM encryption failed".to_string()))?;

    Ok(EncryptedEnvelope {
        ciphertext,
        iv,
        salt,
    })
}

/// Decrypt and authenticate an envelope.
///
/// Returns the full plaintext or [`VaultError::AuthenticationFailed`]; no
/// partial output is ever produced.
pub fn open(envelope: &EncryptedEnvelope, key: &DerivedKey) -> Result<Zeroizing<Vec<u8>>> {
    if envelope.ciphertext.len() < TAG_LEN {
        return Err(VaultError::AuthenticationFailed);
    }

    let cipher = cipher_for(key)?;
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&envelope.iv),
            Payload {
                msg: &envelope.ciphertext,
                aad: &envelope.salt,
            },
        )
        .map_err(|_| VaultError::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// Derive a fresh-salted key from `password` and seal `plaintext` with it.
pub fn seal_with_password(plaintext: &[u8], password: &Credential) -> Result<EncryptedEnvelope> {
    let key = derive(password, None);
    seal(plaintext, &key)
}

/// Re-derive the key from the envelope's own salt and open it.
pub fn open_with_password(
    envelope: &EncryptedEnvelope,
    password: &Credential,
) -> Result<Zeroizing<Vec<u8>>> {
    let key = derive(password, Some(&envelope.salt));
    open(envelope, &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use proptest::prelude::*;
    use std::collections::HashSet;

    static PASSWORD: Lazy<Credential> = Lazy::new(|| Credential::new("correct-horse-battery"));
    static KEY: Lazy<DerivedKey> = Lazy::new(|| derive(&PASSWORD, None));

    #[test]
    fn test_seal_open_round_trip() {
        let envelope = seal(b"Hello, World! This is secret data.", &KEY).unwrap();
        let reopened = derive(&PASSWORD, Some(&envelope.salt));
        let plaintext = open(&envelope, &reopened).unwrap();
        assert_eq!(plaintext.as_slice(), b"Hello, World! This is secret data.");
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = seal(b"abc", &KEY).unwrap();
        assert_eq!(envelope.salt, *KEY.salt());
        assert_eq!(envelope.ciphertext.len(), 3 + TAG_LEN);
    }

    #[test]
    fn test_empty_plaintext() {
        let envelope = seal(b"", &KEY).unwrap();
        assert!(open(&envelope, &KEY).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_password_fails() {
        let envelope = seal_with_password(b"secret data", &Credential::new("password-one")).unwrap();
        let result = open_with_password(&envelope, &Credential::new("password-two"));
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn test_with_password_round_trip() {
        let password = Credential::new("password-one");
        let envelope = seal_with_password(b"secret data", &password).unwrap();
        let plaintext = open_with_password(&envelope, &password).unwrap();
        assert_eq!(plaintext.as_slice(), b"secret data");
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let mut envelope = seal(b"secret data", &KEY).unwrap();
        envelope.ciphertext.truncate(4);
        assert!(matches!(
            open(&envelope, &KEY),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_nonce_uniqueness() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let envelope = seal(b"same plaintext", &KEY).unwrap();
            assert!(seen.insert(envelope.iv), "nonce reused");
        }
    }

    #[test]
    fn test_json_field_names() {
        let envelope = seal(b"abc", &KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert!(value["ciphertext"].is_string());
        assert!(value["iv"].is_string());
        assert!(value["salt"].is_string());

        let parsed = EncryptedEnvelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_json_rejects_short_iv() {
        let json = r#"{"ciphertext":"AAAA","iv":"AAAA","salt":"AAAAAAAAAAAAAAAAAAAAAA=="}"#;
        assert!(EncryptedEnvelope::from_json(json).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip(plaintext in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let envelope = seal(&plaintext, &KEY).unwrap();
            let opened = open(&envelope, &KEY).unwrap();
            prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
        }

        #[test]
        fn prop_any_bit_flip_fails(
            plaintext in proptest::collection::vec(any::<u8>(), 1..256),
            field in 0usize..3,
            position in any::<usize>(),
            bit in 0u8..8,
        ) {
            let mut envelope = seal(&plaintext, &KEY).unwrap();
            let target: &mut [u8] = match field {
                0 => &mut envelope.ciphertext,
                1 => &mut envelope.iv,
                _ => &mut envelope.salt,
            };
            let index = position % target.len();
            target[index] ^= 1 << bit;

            prop_assert!(matches!(open(&envelope, &KEY), Err(VaultError::AuthenticationFailed)));
        }
    }
}
