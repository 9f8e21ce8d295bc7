use clap::CommandFactory;
use clap_complete::generate;

use crate::app::AppContext;
use crate::cli::Cli;

pub fn handle_whoami(ctx: &AppContext) -> anyhow::Result<()> {
    let (_, account) = ctx.open_account()?;
    let fingerprint = account.identity.public()?.fingerprint()?;

    if ctx.quiet() {
        println!("{}", account.id);
        return Ok(());
    }
    println!("Account: {}", account.name);
    println!("ID: {}", account.id);
    println!("Created: {}", account.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Key fingerprint: {}", fingerprint);
    println!("Vault: {}", ctx.vault_path()?.display());
    Ok(())
}

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "notevault", &mut std::io::stdout());
    Ok(())
}
