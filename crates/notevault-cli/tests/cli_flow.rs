use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

const PASSWORD: &str = "test-password-secure-123";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_notevault"))
}

/// Isolated HOME and XDG dirs for one test.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        for dir in ["home", "config", "data"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create sandbox dir");
        }
        Self { root }
    }

    fn config_home(&self) -> PathBuf {
        self.root.path().join("config")
    }

    fn data_home(&self) -> PathBuf {
        self.root.path().join("data")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env_remove("NOTEVAULT_PATH")
            .env_remove("NOTEVAULT_CONFIG")
            .env_remove("NOTEVAULT_PASSWORD")
            .env_remove("RUST_LOG")
            .env("HOME", self.root.path().join("home"))
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.data_home());
        cmd
    }

    fn run(&self, args: &[&str], password: Option<&str>) -> Output {
        let mut cmd = self.command(args);
        if let Some(password) = password {
            cmd.env("NOTEVAULT_PASSWORD", password);
        }
        cmd.output().expect("run notevault")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args, Some(PASSWORD));
        assert!(
            output.status.success(),
            "{:?} failed: stdout={}, stderr={}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn init(&self) {
        self.run_ok(&["init", "--name", "alice", "--no-input"]);
    }

    fn add(&self, title: &str, body: &str) -> String {
        let out = self.run_ok(&["add", "--title", title, "--body", body, "--quiet"]);
        out.trim().to_string()
    }

    fn list_json(&self) -> Vec<serde_json::Value> {
        let out = self.run_ok(&["list", "--json"]);
        let value: serde_json::Value = serde_json::from_str(&out).expect("parse list json");
        value.as_array().expect("list output array").clone()
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn marker_of(records: &[serde_json::Value], id: &str) -> String {
    records
        .iter()
        .find(|record| record["id"] == id)
        .and_then(|record| record["versionMarker"].as_str())
        .expect("version marker")
        .to_string()
}

#[test]
fn test_cli_init_add_list_show() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let id = sandbox.add("Groceries", "milk, eggs, coffee");

    let records = sandbox.list_json();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], id.as_str());
    assert_eq!(records[0]["title"], "Groceries");
    assert!(records[0]["ciphertext"].is_string());
    assert!(records[0]["signature"].is_string());
    // Listing never decrypts.
    assert!(!serde_json::to_string(&records).unwrap().contains("coffee"));

    let shown = sandbox.run_ok(&["show", &id]);
    assert!(shown.contains("milk, eggs, coffee"));
    assert!(shown.contains("Title: Groceries"));
    assert!(shown.contains("Signature: verified"));

    // Unique prefixes work too.
    let shown = sandbox.run_ok(&["show", &id[..8]]);
    assert!(shown.contains("milk, eggs, coffee"));
}

#[test]
fn test_cli_init_writes_default_config() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let vault_path = sandbox.data_home().join("notevault").join("notes.db");
    assert!(vault_path.exists(), "vault file should exist");

    let config_path = sandbox.config_home().join("notevault").join("config.toml");
    let contents = std::fs::read_to_string(&config_path).expect("read config");
    let value: toml::Value = contents.parse().expect("parse config");

    assert_eq!(
        value
            .get("vault")
            .and_then(|section| section.get("path"))
            .and_then(|path| path.as_str()),
        Some(vault_path.to_string_lossy().as_ref())
    );
    assert_eq!(
        value
            .get("account")
            .and_then(|section| section.get("name"))
            .and_then(|name| name.as_str()),
        Some("alice")
    );

    let again = sandbox.run(&["init", "--no-input"], Some(PASSWORD));
    assert_eq!(again.status.code(), Some(4));
    assert!(stderr(&again).contains("Already initialized"));
}

#[test]
fn test_cli_unlock_reports_each_note() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add("one", "first");
    sandbox.add("two", "second");

    let out = sandbox.run_ok(&["unlock"]);
    assert!(out.contains("2 notes: 2 decrypted, 2 verified"), "{}", out);

    let out = sandbox.run_ok(&["unlock", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).expect("parse unlock json");
    let items = value.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|item| item["isDecrypted"] == true && item["isVerified"] == true));
}

#[test]
fn test_cli_wrong_password_is_auth_failure() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let output = sandbox.run(&["unlock"], Some("definitely not it"));
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("Incorrect password"));
}

#[test]
fn test_cli_stale_edit_conflicts_until_forced() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let id = sandbox.add("Plan", "v1");
    let original_marker = marker_of(&sandbox.list_json(), &id);

    sandbox.run_ok(&["edit", &id, "--body", "v2", "--marker", &original_marker]);
    let new_marker = marker_of(&sandbox.list_json(), &id);
    assert_ne!(new_marker, original_marker);

    let stale = sandbox.run(
        &["edit", &id, "--body", "v3", "--marker", &original_marker],
        Some(PASSWORD),
    );
    assert_eq!(stale.status.code(), Some(6));
    assert!(stderr(&stale).contains(&new_marker));
    assert!(stderr(&stale).contains("--force"));
    assert!(sandbox.run_ok(&["show", &id]).contains("v2"));

    sandbox.run_ok(&["edit", &id, "--body", "v4", "--force", "--title", "Final plan"]);
    let shown = sandbox.run_ok(&["show", &id]);
    assert!(shown.contains("v4"));
    assert!(shown.contains("Title: Final plan"));
}

#[test]
fn test_cli_delete() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let id = sandbox.add("Temp", "gone soon");

    sandbox.run_ok(&["delete", &id]);
    assert!(sandbox.list_json().is_empty());

    let output = sandbox.run(&["show", &id], Some(PASSWORD));
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_cli_missing_config_message() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["list"], None);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("notevault init"));
}

#[test]
fn test_cli_missing_config_message_uses_env_override() {
    let sandbox = Sandbox::new();
    let custom = sandbox.root.path().join("elsewhere.toml");
    let output = sandbox
        .command(&["list"])
        .env("NOTEVAULT_CONFIG", &custom)
        .output()
        .expect("run list");
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains(&custom.to_string_lossy().to_string()));
}

#[test]
fn test_cli_init_no_input_requires_password() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["init", "--no-input"], None);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("--no-input requires NOTEVAULT_PASSWORD"));
}

#[test]
fn test_cli_init_rejects_weak_password() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["init", "--no-input"], Some("short"));
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("at least 8 characters"));
}

#[test]
fn test_cli_whoami_shows_fingerprint() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let out = sandbox.run_ok(&["whoami"]);
    assert!(out.contains("Account: alice"));
    assert!(out.contains("Key fingerprint:"));
}

#[test]
fn test_cli_completions() {
    let sandbox = Sandbox::new();
    let out = sandbox.run_ok(&["completions", "bash"]);
    assert!(out.contains("notevault"));
}

