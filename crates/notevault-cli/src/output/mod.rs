//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying notes
//! as JSON or as plain text tables.

mod json;
mod text;

// Re-export public API
pub use json::{opened_json, opened_list_json, records_json};
pub use text::{print_opened, print_record_list, print_unlock_report, short_id};
