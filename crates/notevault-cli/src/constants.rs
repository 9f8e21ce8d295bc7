//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells and clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// Resource not found (config, vault, account, record).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// The record changed since it was read.
    pub const CONFLICT: i32 = 6;
}

/// Environment variable holding the vault password for non-interactive use.
pub const PASSWORD_ENV: &str = "NOTEVAULT_PASSWORD";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "NOTEVAULT_CONFIG";

/// Password attempts allowed at an interactive prompt.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;
