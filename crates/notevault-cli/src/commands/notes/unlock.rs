use notevault_core::RecordStore;

use crate::app::{AppContext, Unlocked};
use crate::cli::UnlockArgs;
use crate::output::{opened_list_json, print_unlock_report};

/// Decrypt and verify the whole vault. Notes that fail are reported, not fatal.
pub fn handle_unlock(ctx: &AppContext, args: &UnlockArgs) -> anyhow::Result<()> {
    let Unlocked {
        store,
        account,
        mut session,
    } = ctx.unlock(args.no_input)?;

    session.set_records(store.list(account.id)?);
    let opened = session.decrypt_loaded()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&opened_list_json(&opened))?);
    } else {
        print_unlock_report(&opened, ctx.quiet());
    }
    session.logout();
    Ok(())
}
