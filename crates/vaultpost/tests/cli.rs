//! Binary smoke tests that need no forum.

use std::process::Command;
use tempfile::TempDir;

fn vaultpost() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vaultpost"));
    for (key, _) in std::env::vars() {
        if key.starts_with("VAULTPOST_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("vaultpost.yaml");

    let status = vaultpost()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(config.exists());

    let again = vaultpost()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .output()
        .unwrap();
    assert!(!again.status.success());

    let shown = vaultpost()
        .arg("--config")
        .arg(&config)
        .arg("--vault")
        .arg(dir.path())
        .env("VAULTPOST_FORUM__API_KEY", "very-secret")
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(shown.status.success());
    let stdout = String::from_utf8(shown.stdout).unwrap();
    assert!(stdout.contains("https://forum.example.com"));
    assert!(!stdout.contains("very-secret"));
}

#[test]
fn test_missing_settings_fail() {
    let dir = TempDir::new().unwrap();
    let output = vaultpost()
        .arg("--config")
        .arg(dir.path().join("absent.yaml"))
        .arg("categories")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load settings"));
}

#[test]
fn test_category_and_pick_conflict() {
    let output = vaultpost()
        .args(["publish", "Note.md", "--category", "3", "--pick"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
