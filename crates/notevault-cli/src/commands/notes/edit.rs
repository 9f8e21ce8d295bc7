use chrono::SecondsFormat;

use notevault_core::{RecordStore, VaultError};

use crate::app::{AppContext, Unlocked};
use crate::cli::EditArgs;
use crate::errors::CliError;
use crate::helpers::{parse_marker, read_body, resolve_record_id};

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let Unlocked {
        store,
        account,
        mut session,
    } = ctx.unlock(args.no_input)?;

    let id = resolve_record_id(&store, account.id, &args.id)?;
    let current = store.fetch(account.id, id)?;
    let read_marker = current.version_marker;

    session.set_records(vec![current]);
    let opened = session.decrypt_loaded()?;
    let existing = opened.first().and_then(|item| item.plaintext());
    let body = read_body(args.no_input, args.body.clone(), ctx.editor()?, existing)?;

    let mut request = if args.force {
        session.seal_forced_update(&body)?
    } else {
        let last_known = match args.marker.as_deref() {
            Some(value) => parse_marker(value)?,
            None => read_marker,
        };
        session.seal_update(&body, last_known)?
    };
    if let Some(title) = args.title.as_deref() {
        request = request.with_title(title);
    }

    match store.update(account.id, id, &request) {
        Ok(marker) => {
            if !ctx.quiet() {
                println!(
                    "Updated note {} (version {})",
                    id,
                    marker.to_rfc3339_opts(SecondsFormat::Nanos, true)
                );
            }
            Ok(())
        }
        Err(VaultError::Conflict { server_record }) => Err(CliError::conflict(
            format!(
                "Note {} was changed by someone else (current version {}).",
                server_record.id,
                server_record
                    .version_marker
                    .to_rfc3339_opts(SecondsFormat::Nanos, true)
            ),
            "Hint: Run `notevault show` to see the current text, then re-run with --marker <version> to replace it, or --force to overwrite it.",
        )
        .into()),
        Err(err) => Err(err.into()),
    }
}
