//! Application context for the Notevault CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use notevault_core::{Account, AccountStore, BearerToken, SqliteStore, VaultSession};

use crate::cli::Cli;
use crate::config::{read_config, NotevaultConfig};
use crate::errors::CliError;

use super::password::unlock_with_retry;
use super::resolver::{missing_config_message, missing_vault_message, resolve_config_path, INIT_HINT};

/// A store, its account, and a session unlocked for that account.
pub struct Unlocked {
    pub store: SqliteStore,
    pub account: Account,
    pub session: VaultSession,
}

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<NotevaultConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the config file, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&NotevaultConfig> {
        self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if !path.exists() {
                return Err(CliError::not_found(missing_config_message(&path), INIT_HINT).into());
            }
            read_config(&path)
        })
    }

    /// Get the configured editor override, if any.
    pub fn editor(&self) -> anyhow::Result<Option<&str>> {
        Ok(self.config()?.ui.editor.as_deref())
    }

    /// The vault database path: `--vault`/NOTEVAULT_PATH, else the config.
    pub fn vault_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.vault.as_deref() {
            return Ok(PathBuf::from(path));
        }
        Ok(PathBuf::from(&self.config()?.vault.path))
    }

    /// Open the vault database, which must already exist.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.vault_path()?;
        if !path.exists() {
            return Err(CliError::not_found(missing_vault_message(&path), INIT_HINT).into());
        }
        Ok(SqliteStore::open(&path)?)
    }

    /// Open the store and load the configured account from it.
    pub fn open_account(&self) -> anyhow::Result<(SqliteStore, Account)> {
        let store = self.open_store()?;
        let id = self.config()?.account.id;
        let account = store.get_account(id)?.ok_or_else(|| {
            CliError::not_found(
                format!("Account {} is not in this vault", id),
                "Hint: The config and the vault path disagree. Check [vault] path in the config.",
            )
        })?;
        Ok((store, account))
    }

    /// Open the store and unlock a session for the configured account.
    pub fn unlock(&self, no_input: bool) -> anyhow::Result<Unlocked> {
        let (store, account) = self.open_account()?;
        let mut session = VaultSession::new(BearerToken::new(account.id.to_string()));
        unlock_with_retry(&mut session, &account, no_input)?;
        Ok(Unlocked {
            store,
            account,
            session,
        })
    }
}
