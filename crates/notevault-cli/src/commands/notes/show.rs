use notevault_core::RecordStore;

use crate::app::{AppContext, Unlocked};
use crate::cli::ShowArgs;
use crate::helpers::resolve_record_id;
use crate::output::{opened_json, print_opened};

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let Unlocked {
        store,
        account,
        mut session,
    } = ctx.unlock(args.no_input)?;

    let id = resolve_record_id(&store, account.id, &args.id)?;
    session.set_records(vec![store.fetch(account.id, id)?]);
    let opened = session.decrypt_loaded()?;

    for item in &opened {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&opened_json(item))?);
        } else {
            print_opened(item);
        }
    }
    Ok(())
}
