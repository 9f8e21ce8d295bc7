//! Account registration.

use tracing::info;

use crate::crypto::{validate_passphrase, Credential, Identity};
use crate::error::{Result, VaultError};
use crate::storage::types::Account;

impl Account {
    /// Create an account: generate a key pair and wrap it under `password`.
    ///
    /// The returned [`Account`] is what an account store keeps; the
    /// [`Identity`] is handed back so the caller can go straight to an
    /// unlocked session without a second derivation.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` for a blank name or a password
    /// that fails the passphrase policy.
    pub fn register(name: &str, password: &Credential) -> Result<(Account, Identity)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::InvalidInput(
                "Account name cannot be empty".to_string(),
            ));
        }
        validate_passphrase(password.expose_str())?;

        let identity = Identity::generate()?;
        let account = Account::new(name, identity.wrap(password)?);
        info!(account_id = %account.id, "registered account");
        Ok((account, identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_wraps_generated_identity() {
        let password = Credential::new("long enough pass");
        let (account, identity) = Account::register("  alice ", &password).unwrap();

        assert_eq!(account.name, "alice");
        assert_eq!(&account.identity.public().unwrap(), identity.public());

        let reopened = Identity::unwrap_from(&account.identity, &password).unwrap();
        assert_eq!(reopened.public(), identity.public());
    }

    #[test]
    fn test_register_rejects_weak_password_and_blank_name() {
        assert!(matches!(
            Account::register("alice", &Credential::new("short")),
            Err(VaultError::InvalidInput(_))
        ));
        assert!(matches!(
            Account::register("   ", &Credential::new("long enough pass")),
            Err(VaultError::InvalidInput(_))
        ));
    }
}
