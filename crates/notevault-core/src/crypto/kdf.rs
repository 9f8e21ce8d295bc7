//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every envelope carries its own salt, so the same password re-derives the
//! same key later. Derivation cannot tell a right password from a wrong
//! one; that only shows up when the envelope's tag fails to verify.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::credential::Credential;

/// PBKDF2 iteration count. Lowering this weakens every stored envelope.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Length of derived key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Per-derivation random salt.
pub type Salt = [u8; SALT_LEN];

/// A symmetric key derived from a password, together with the salt used.
///
/// Key material is zeroized when dropped and never printed.
#[derive(ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
    salt: Salt,
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// The salt this key was derived with.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .field("salt", &self.salt)
            .finish()
    }
}

/// Generate a fresh random salt.
pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a key from `password`.
///
/// With `salt = None` a fresh random salt is drawn (new envelopes). Pass the
/// stored salt to re-derive the key for an existing envelope.
pub fn derive(password: &Credential, salt: Option<&Salt>) -> DerivedKey {
    let salt = match salt {
        Some(salt) => *salt,
        None => generate_salt(),
    };

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.expose(), &salt, PBKDF2_ITERATIONS, &mut key);

    DerivedKey { key, salt }
}
