//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use zeroize::Zeroizing;

use notevault_core::{RecordStore, SqliteStore};

use crate::errors::CliError;

/// Parse a version marker (RFC 3339, full precision kept).
pub fn parse_marker(value: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            CliError::invalid_input(format!(
                "Invalid version marker (expected RFC 3339): {}",
                value
            ))
            .into()
        })
}

/// Resolve a full UUID or a unique prefix of one of `owner`'s record ids.
pub fn resolve_record_id(store: &SqliteStore, owner: Uuid, value: &str) -> anyhow::Result<Uuid> {
    let value = value.trim();
    if let Ok(id) = Uuid::parse_str(value) {
        return Ok(id);
    }
    if value.len() < 4 {
        return Err(CliError::invalid_input(format!(
            "Note ID prefix '{}' is too short (use at least 4 characters)",
            value
        ))
        .into());
    }

    let prefix = value.to_lowercase();
    let matches: Vec<Uuid> = store
        .list(owner)?
        .into_iter()
        .map(|record| record.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CliError::not_found(
            format!("No note matches '{}'", value),
            "Hint: Run `notevault list` to find note IDs.",
        )
        .into()),
        _ => Err(CliError::invalid_input(format!(
            "Note ID prefix '{}' is ambiguous ({} matches)",
            value,
            matches.len()
        ))
        .into()),
    }
}

/// Read a note body from `--body`, piped stdin, or the editor.
///
/// `initial` pre-fills the editor buffer when editing an existing note.
pub fn read_body(
    no_input: bool,
    body: Option<String>,
    editor_override: Option<&str>,
    initial: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--body cannot be empty").into());
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(CliError::invalid_input("No input provided on stdin").into());
        }
        return Ok(trimmed);
    }

    if no_input {
        return Err(CliError::invalid_input("--no-input requires --body or content on stdin").into());
    }

    read_body_from_editor(editor_override, initial.unwrap_or(""))
}

/// Open $EDITOR to compose a note body.
fn read_body_from_editor(editor_override: Option<&str>, initial: &str) -> anyhow::Result<String> {
    let editor = editor_override
        .map(|value| value.to_string())
        .or_else(|| std::env::var("EDITOR").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("$EDITOR is not set; use --body or pipe content via stdin")
        })?;

    edit_in_temp_file(&editor, initial, &std::env::temp_dir())
}

/// Run `editor` on an owner-only scratch file in `dir`. The file is removed
/// on every return path.
fn edit_in_temp_file(editor: &str, initial: &str, dir: &Path) -> anyhow::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("notevault_")
        .suffix(".md")
        .tempfile_in(dir)
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;
    file.write_all(initial.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| anyhow::anyhow!("Failed to write temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(file.path())
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = Zeroizing::new(
        std::fs::read_to_string(file.path())
            .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?,
    );
    file.close()
        .map_err(|e| anyhow::anyhow!("Failed to remove temp file: {}", e))?;

    let trimmed = contents.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("Note body is empty").into());
    }

    Ok(trimmed)
}
