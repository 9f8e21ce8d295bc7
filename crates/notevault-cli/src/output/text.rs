//! Text and table output formatting for notes.

use chrono::SecondsFormat;
use comfy_table::{presets, ContentArrangement, Table};
use uuid::Uuid;

use notevault_core::{OpenedRecord, RecordOutcome, SignedRecord};

/// First eight hex digits of an id, enough to type back as a prefix.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn borderless(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Print stored notes, newest first. Quiet mode prints full ids only.
pub fn print_record_list(records: &[SignedRecord], quiet: bool) {
    if quiet {
        for record in records {
            println!("{}", record.id);
        }
        return;
    }
    if records.is_empty() {
        println!("No notes yet. Add one with `notevault add`.");
        return;
    }

    let mut table = borderless(&["ID", "TITLE", "UPDATED", "SIGNED"]);
    for record in records {
        table.add_row(vec![
            short_id(&record.id),
            record.title.clone(),
            record
                .version_marker
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            yes_no(record.signature.is_some()).to_string(),
        ]);
    }
    println!("{}", table);
}

/// Print one decrypted note in full.
pub fn print_opened(opened: &OpenedRecord) {
    let record = &opened.record;
    println!("Title: {}", record.title);
    println!("ID: {}", record.id);
    println!("Created: {}", record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true));
    println!(
        "Version: {}",
        record.version_marker.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );
    match &opened.outcome {
        RecordOutcome::Decrypted { plaintext, verified } => {
            println!(
                "Signature: {}",
                if *verified { "verified" } else { "NOT VERIFIED" }
            );
            println!();
            println!("{}", plaintext.as_str());
        }
        RecordOutcome::Undecryptable { reason } => {
            println!("Body: could not be decrypted ({})", reason);
        }
    }
}

/// Print the per-note outcome of a bulk unlock, then a summary line.
pub fn print_unlock_report(opened: &[OpenedRecord], quiet: bool) {
    let decrypted = opened.iter().filter(|r| r.is_decrypted()).count();
    let verified = opened.iter().filter(|r| r.is_verified()).count();

    if !quiet && !opened.is_empty() {
        let mut table = borderless(&["ID", "TITLE", "DECRYPTED", "VERIFIED"]);
        for item in opened {
            table.add_row(vec![
                short_id(&item.record.id),
                item.record.title.clone(),
                yes_no(item.is_decrypted()).to_string(),
                yes_no(item.is_verified()).to_string(),
            ]);
        }
        println!("{}", table);
    }
    println!(
        "{} notes: {} decrypted, {} verified",
        opened.len(),
        decrypted,
        verified
    );
}
