//! Cryptographic operations for Notevault.
//!
//! All primitives come from the RustCrypto crates:
//! - **PBKDF2-HMAC-SHA256** (100k rounds): password → 32-byte key
//! - **AES-256-GCM**: authenticated envelopes, salt bound as associated data
//! - **RSA-PSS / SHA-256** (2048-bit): note signatures
//!
//! ## Security Model
//!
//! - Plaintext and keys never leave the process unencrypted
//! - Each envelope has its own salt and nonce
//! - The identity's private key is wrapped under the account password
//! - Sensitive data zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - A storage server (or its database) reading or silently altering notes
//! - Offline brute-force attacks on the password
//! - Lost updates from concurrent edits
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / memory

pub mod credential;
pub mod envelope;
pub mod identity;
pub mod kdf;
pub mod passphrase;

pub use credential::Credential;
pub use envelope::{
    open, open_with_password, seal, seal_with_password, EncryptedEnvelope, IV_LEN, TAG_LEN,
};
pub use identity::{Identity, PublicIdentity, WrappedIdentity, RSA_BITS};
pub use kdf::{derive, generate_salt, DerivedKey, Salt, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
pub use passphrase::validate_passphrase;
