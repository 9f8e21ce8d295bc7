//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes. Anything else that bubbles up
//! through `anyhow` exits with the general failure code.

use std::fmt;

use notevault_core::VaultError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, vault, account, record)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// The record was changed by someone else since it was read
    Conflict { message: String, hint: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } | CliError::Conflict { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Create a Conflict error with message and hint.
    pub fn conflict(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::Conflict {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Conflict { .. } => exit_codes::CONFLICT,
        }
    }
}

/// Exit code for any error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    match err.downcast_ref::<VaultError>() {
        Some(VaultError::NotFound(_)) | Some(VaultError::AccountNotFound(_)) => {
            exit_codes::NOT_FOUND
        }
        Some(VaultError::WrongPassword)
        | Some(VaultError::AuthenticationFailed)
        | Some(VaultError::Forbidden(_)) => exit_codes::AUTH_FAILED,
        Some(VaultError::InvalidInput(_)) => exit_codes::INVALID_INPUT,
        Some(VaultError::Conflict { .. }) => exit_codes::CONFLICT,
        _ => exit_codes::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_exit_codes() {
        let err = anyhow::Error::new(CliError::invalid_input("bad"));
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);

        let err = anyhow::Error::new(VaultError::NotFound(Uuid::nil()));
        assert_eq!(exit_code_for(&err), exit_codes::NOT_FOUND);

        let err = anyhow::Error::new(VaultError::WrongPassword);
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_FAILED);

        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), exit_codes::FAILURE);
    }

    #[test]
    fn test_display_includes_hint() {
        let err = CliError::conflict("Record changed", "Hint: use --force");
        assert_eq!(err.to_string(), "Record changed\nHint: use --force");
    }
}
