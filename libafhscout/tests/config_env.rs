//! Config resolution through the environment
//!
//! These tests mutate process environment variables, so they run serially.

use std::io::Write;

use libafhscout::config::{resolve_config_path, CONFIG_ENV_VAR};
use libafhscout::{ConcurrencyPolicy, Config};
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_env_var_overrides_config_path() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("scout.toml");
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let resolved = resolve_config_path();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(resolved?, path);
    Ok(())
}

#[test]
#[serial]
fn test_load_reads_file_named_by_env() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("scout.toml");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "[guard]\npolicy = \"overlap\"")?;
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let loaded = Config::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(loaded?.guard.policy, ConcurrencyPolicy::Overlap);
    Ok(())
}

#[test]
#[serial]
fn test_load_or_default_without_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    std::env::set_var(CONFIG_ENV_VAR, dir.path().join("missing.toml"));

    let loaded = Config::load_or_default();
    let strict = Config::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(loaded?, Config::default());
    assert!(strict.is_err());
    Ok(())
}
