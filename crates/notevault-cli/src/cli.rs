use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use notevault_core::VERSION;

/// Notevault - an end-to-end encrypted, signed note vault
#[derive(Parser)]
#[command(name = "notevault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the vault database
    #[arg(long, global = true, env = "NOTEVAULT_PATH")]
    pub vault: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and an empty vault
    Init(InitArgs),

    /// Encrypt, sign and store a new note
    Add(AddArgs),

    /// List notes (titles only, nothing is decrypted)
    List(ListArgs),

    /// Decrypt and verify a single note
    Show(ShowArgs),

    /// Decrypt and verify every note, reporting each outcome
    Unlock(UnlockArgs),

    /// Replace a note's body, guarded by its version marker
    Edit(EditArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// Show the current account and its key fingerprint
    Whoami,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Account name
    #[arg(long)]
    pub name: Option<String>,

    /// Default editor for note bodies
    #[arg(long)]
    pub editor: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Note title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Note body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Note ID (full UUID or unique prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `unlock` command
#[derive(Args)]
pub struct UnlockArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Note ID (full UUID or unique prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title (keeps the current one if omitted)
    #[arg(short, long)]
    pub title: Option<String>,

    /// New body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Version marker the edit is based on (RFC 3339); defaults to the
    /// marker read when the edit starts
    #[arg(long, value_name = "MARKER", conflicts_with = "force")]
    pub marker: Option<String>,

    /// Overwrite even if the note changed since it was read
    #[arg(long)]
    pub force: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID (full UUID or unique prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}
