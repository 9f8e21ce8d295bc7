use notevault_core::RecordStore;

use crate::app::{AppContext, Unlocked};
use crate::cli::AddArgs;
use crate::helpers::read_body;

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let Unlocked {
        store,
        account,
        session,
    } = ctx.unlock(args.no_input)?;

    let body = read_body(args.no_input, args.body.clone(), ctx.editor()?, None)?;
    let record = session.encrypt_and_sign(args.title.as_deref(), &body)?;
    let stored = store.create(account.id, &record)?;

    if ctx.quiet() {
        println!("{}", stored.id);
    } else {
        println!("Added note {} ({})", stored.id, stored.title);
    }
    Ok(())
}
