//! Password handling and session unlocking with retry logic.

use std::io::IsTerminal;

use dialoguer::Password;
use notevault_core::crypto::validate_passphrase;
use notevault_core::{Account, Credential, VaultError, VaultSession};
use tracing::debug;

use crate::constants::{MAX_PASSWORD_ATTEMPTS, PASSWORD_ENV};
use crate::errors::CliError;

const FORGOTTEN_HINT: &str =
    "Hint: The private key is wrapped under this password. If it is lost, the notes cannot be recovered.";

fn env_password() -> Option<String> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Password for a new account: NOTEVAULT_PASSWORD, or a confirmed prompt.
///
/// The prompt repeats until the password meets the passphrase policy.
pub fn prompt_new_password(no_input: bool) -> anyhow::Result<Credential> {
    if let Some(value) = env_password() {
        check_new_password(&value)?;
        return Ok(Credential::new(value));
    }
    if no_input || !std::io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "--no-input requires {} to be set",
            PASSWORD_ENV
        ))
        .into());
    }
    loop {
        let value = Password::new()
            .with_prompt("Choose a vault password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
        if let Err(err) = check_new_password(&value) {
            eprintln!("{}", err);
            continue;
        }
        return Ok(Credential::new(value));
    }
}

fn check_new_password(value: &str) -> Result<(), CliError> {
    validate_passphrase(value).map_err(|e| {
        CliError::invalid_input(format!("Password does not meet requirements: {}", e))
    })
}

/// Unlock `session` with the account's wrapped identity.
///
/// NOTEVAULT_PASSWORD gets exactly one attempt; an interactive prompt gets
/// up to three.
pub fn unlock_with_retry(
    session: &mut VaultSession,
    account: &Account,
    no_input: bool,
) -> anyhow::Result<()> {
    if let Some(value) = env_password() {
        return match session.unlock(&account.identity, Credential::new(value)) {
            Ok(()) => Ok(()),
            Err(VaultError::WrongPassword) => Err(CliError::auth_failed_with_hint(
                "Incorrect password.",
                format!("Hint: Check the value of {}.", PASSWORD_ENV),
            )
            .into()),
            Err(err) => Err(err.into()),
        };
    }

    let interactive = std::io::stdin().is_terminal() && !no_input;
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            PASSWORD_ENV
        ))
        .into());
    }

    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let password = Credential::new(prompt_password("Vault password")?);
        match session.unlock(&account.identity, password) {
            Ok(()) => return Ok(()),
            Err(VaultError::WrongPassword) => {
                let remaining = MAX_PASSWORD_ATTEMPTS.saturating_sub(attempts);
                debug!(attempts, "password rejected");
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed password attempts.",
                        FORGOTTEN_HINT,
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect password. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_password_policy() {
        assert!(check_new_password("long-enough-password").is_ok());

        let err = check_new_password("short").unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert!(err.to_string().contains("at least 8 characters"));
    }
}
