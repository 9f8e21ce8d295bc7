use notevault_core::RecordStore;

use crate::app::{AppContext, Unlocked};
use crate::cli::DeleteArgs;
use crate::helpers::resolve_record_id;

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    // Unlocking proves the caller holds the account password.
    let Unlocked { store, account, .. } = ctx.unlock(args.no_input)?;

    let id = resolve_record_id(&store, account.id, &args.id)?;
    store.delete(account.id, id)?;

    if !ctx.quiet() {
        println!("Deleted note {}", id);
    }
    Ok(())
}
