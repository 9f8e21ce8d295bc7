use std::path::PathBuf;

use notevault_core::{Account, AccountStore, SqliteStore};

use crate::app::{prompt_new_password, resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_vault_path, write_config, NotevaultConfig};
use crate::errors::CliError;

fn default_account_name() -> String {
    std::env::var("USER")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "me".to_string())
}

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() {
        return Err(CliError::invalid_input(format!(
            "Already initialized: config exists at {}",
            config_path.display()
        ))
        .into());
    }

    let vault_path = match ctx.cli().vault.as_deref() {
        Some(path) => PathBuf::from(path),
        None => default_vault_path()?,
    };
    let name = args.name.clone().unwrap_or_else(default_account_name);

    let password = prompt_new_password(args.no_input)?;
    let (account, identity) = Account::register(&name, &password)?;

    if let Some(parent) = vault_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("Failed to create vault directory {}: {}", parent.display(), e)
        })?;
    }
    let store = SqliteStore::open(&vault_path)?;
    store.put_account(&account)?;

    let config = NotevaultConfig::new(&vault_path, account.id, &account.name, args.editor.clone());
    write_config(&config_path, &config)?;

    if !ctx.quiet() {
        println!("Created vault at {}", vault_path.display());
        println!("Account: {} ({})", account.name, account.id);
        println!("Key fingerprint: {}", identity.public().fingerprint()?);
        println!("Config: {}", config_path.display());
    }
    Ok(())
}
