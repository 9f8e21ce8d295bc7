use notevault_core::RecordStore;

use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::output::{print_record_list, records_json};

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let (store, account) = ctx.open_account()?;
    let mut records = store.list(account.id)?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records_json(&records))?);
    } else {
        print_record_list(&records, ctx.quiet());
    }
    Ok(())
}
