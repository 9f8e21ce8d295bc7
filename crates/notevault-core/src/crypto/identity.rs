//! Account identity: an RSA key pair used to sign note plaintext.
//!
//! - Public half: SubjectPublicKeyInfo DER, base64 on the wire.
//! - Private half: PKCS#8 DER, only ever stored wrapped in an
//!   [`EncryptedEnvelope`] sealed under the account password.
//! - Signatures: RSA-PSS over SHA-256 with a 32-byte random salt, so two
//!   signatures of the same note differ but both verify.
//!
//! Key-handling rules
//! ------------------
//! Unwrapping fails with [`VaultError::WrongPassword`] for every cause
//! (bad tag, bad JSON, bad DER, mismatched public key). Callers cannot tell a
//! corrupted account record from a mistyped password, and should not try.

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::credential::Credential;
use super::envelope::{open_with_password, seal_with_password, EncryptedEnvelope};
use crate::encoding;
use crate::error::{Result, VaultError};

/// RSA modulus size in bits.
pub const RSA_BITS: usize = 2048;

// ── Public identity ───────────────────────────────────────────────────────────

/// The verifying half of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIdentity {
    key: RsaPublicKey,
}

impl PublicIdentity {
    /// Export as SubjectPublicKeyInfo DER.
    pub fn export(&self) -> Result<Vec<u8>> {
        let document = self
            .key
            .to_public_key_der()
            .map_err(|e| VaultError::InvalidKey(format!("Public key export failed: {}", e)))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Import from SubjectPublicKeyInfo DER.
    pub fn import(der: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| VaultError::InvalidKey(format!("Public key import failed: {}", e)))?;
        Ok(Self { key })
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(encoding::encode(&self.export()?))
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        Self::import(&encoding::decode(text)?)
    }

    /// Check an RSA-PSS signature over `plaintext`.
    ///
    /// Never errors: malformed signatures, wrong keys and altered plaintext
    /// are all just `false`.
    pub fn verify(&self, plaintext: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        VerifyingKey::<Sha256>::new(self.key.clone())
            .verify(plaintext, &signature)
            .is_ok()
    }

    /// Human-readable fingerprint: SHA-256 of the DER public key, truncated
    /// to 20 bytes, hex in groups of 4.
    ///
    /// Example: "a1b2 c3d4 e5f6 7890 abcd ef01 2345 6789 0abc def0"
    pub fn fingerprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.export()?);
        let hex: String = digest[..20].iter().map(|b| format!("{:02x}", b)).collect();
        Ok(hex
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

// ── Identity key pair ─────────────────────────────────────────────────────────

/// A full key pair. The private key is zeroized when dropped.
pub struct Identity {
    public: PublicIdentity,
    private: RsaPrivateKey,
}

impl Identity {
    /// Generate a fresh 2048-bit key pair.
    pub fn generate() -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, RSA_BITS)
            .map_err(|e| VaultError::Crypto(format!("Key generation failed: {}", e)))?;
        Ok(Self::from_private(private))
    }

    fn from_private(private: RsaPrivateKey) -> Self {
        let public = PublicIdentity {
            key: private.to_public_key(),
        };
        Self { public, private }
    }

    pub fn public(&self) -> &PublicIdentity {
        &self.public
    }

    /// Export the private key as PKCS#8 DER.
    ///
    /// # Security
    ///
    /// The result must be wrapped (see [`Identity::wrap`]) before it leaves
    /// the process.
    pub fn export_private(&self) -> Result<Zeroizing<Vec<u8>>> {
        let document = self
            .private
            .to_pkcs8_der()
            .map_err(|e| VaultError::InvalidKey(format!("Private key export failed: {}", e)))?;
        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    /// Import a key pair from PKCS#8 DER; the public half is recomputed.
    pub fn import_private(der: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| VaultError::InvalidKey(format!("Private key import failed: {}", e)))?;
        Ok(Self::from_private(private))
    }

    /// Sign `plaintext` with RSA-PSS (randomized salt).
    pub fn sign(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let signing_key = BlindedSigningKey::<Sha256>::new(self.private.clone());
        let signature = signing_key
            .try_sign_with_rng(&mut OsRng, plaintext)
            .map_err(|e| VaultError::Crypto(format!("Signing failed: {}", e)))?;
        Ok(signature.to_vec())
    }

    /// Seal the private key under `password` for storage.
    pub fn wrap(&self, password: &Credential) -> Result<WrappedIdentity> {
        let der = self.export_private()?;
        let envelope = seal_with_password(&der, password)?;
        Ok(WrappedIdentity {
            public_key: self.public.to_base64()?,
            wrapped_private_key: envelope.to_json()?,
        })
    }

    /// Recover the key pair from its stored, wrapped form.
    pub fn unwrap_from(wrapped: &WrappedIdentity, password: &Credential) -> Result<Self> {
        let envelope = EncryptedEnvelope::from_json(&wrapped.wrapped_private_key)
            .map_err(|_| VaultError::WrongPassword)?;
        let der = open_with_password(&envelope, password).map_err(|_| VaultError::WrongPassword)?;
        let identity = Self::import_private(&der).map_err(|_| VaultError::WrongPassword)?;

        let stored_public = PublicIdentity::from_base64(&wrapped.public_key)
            .map_err(|_| VaultError::WrongPassword)?;
        if stored_public != identity.public {
            return Err(VaultError::WrongPassword);
        }

        Ok(identity)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Identity as held by the account store: base64 SPKI public key plus the
/// JSON-encoded envelope of the PKCS#8 private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedIdentity {
    pub public_key: String,
    pub wrapped_private_key: String,
}

impl WrappedIdentity {
    /// Parse the public half without needing the password.
    pub fn public(&self) -> Result<PublicIdentity> {
        PublicIdentity::from_base64(&self.public_key)
    }
}
