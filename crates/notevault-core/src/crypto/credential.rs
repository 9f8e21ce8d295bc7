//! The transient password held while an operation (or unlocked session) runs.

use secrecy::{ExposeSecret, SecretString};

/// A user password. Zeroized on drop, redacted in `Debug`, never serialized.
pub struct Credential {
    password: SecretString,
}

impl Credential {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
        }
    }

    /// Raw password bytes for key derivation only.
    pub(crate) fn expose(&self) -> &[u8] {
        self.password.expose_secret().as_bytes()
    }

    /// The password as text, for passphrase policy checks.
    pub fn expose_str(&self) -> &str {
        self.password.expose_secret()
    }
}

impl From<String> for Credential {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for Credential {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credential = Credential::new("hunter2-hunter2");
        let debug_output = format!("{:?}", credential);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("hunter2"));
    }
}
