//! Application-level utilities for the Notevault CLI.
//!
//! This module provides:
//! - Path resolution for config and vault files
//! - The per-invocation application context
//! - Password handling with retry logic

mod context;
mod password;
mod resolver;

// Re-export public API
pub use context::{AppContext, Unlocked};
pub use password::prompt_new_password;
pub use resolver::resolve_config_path;
