//! Layered settings: defaults, YAML file, `VAULTPOST_*` environment, CLI flags.
//!
//! Environment keys use `__` between levels, e.g. `VAULTPOST_FORUM__API_KEY`
//! or `VAULTPOST_VAULT__PATH`.

use config::{Config, Environment, File, FileFormat, Map};
use std::path::{Path, PathBuf};
use vaultpost_core::config::{DEFAULT_MAX_ASSET_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
use vaultpost_core::{Error, Result, SyncConfig};

pub const ENV_PREFIX: &str = "VAULTPOST";

/// Values given on the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub vault_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub api_username: Option<String>,
    pub category: Option<u64>,
    pub log_level: Option<String>,
}

/// Build the effective configuration from the process environment.
///
/// A missing file at `path` is not an error; the other layers may still
/// supply every required field.
pub fn load_settings(path: &Path, overrides: &CliOverrides) -> Result<SyncConfig> {
    load_settings_with_env(path, overrides, None)
}

/// Like [`load_settings`], reading environment variables from `env` instead
/// of the process when given.
pub fn load_settings_with_env(
    path: &Path,
    overrides: &CliOverrides,
    env: Option<Map<String, String>>,
) -> Result<SyncConfig> {
    if path.exists() {
        log::debug!("Loading settings from {}", path.display());
    }

    let settings = Config::builder()
        .set_default("log_level", "info")
        .and_then(|b| b.set_default("forum.category", 1i64))
        .and_then(|b| b.set_default("forum.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64))
        .and_then(|b| b.set_default("forum.url_field", "either"))
        .and_then(|b| b.set_default("vault.max_asset_size", DEFAULT_MAX_ASSET_SIZE as i64))
        .map_err(settings_error)?
        .add_source(File::from(path).format(FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .set_override_option(
            "vault.path",
            overrides
                .vault_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        )
        .and_then(|b| b.set_override_option("forum.base_url", overrides.base_url.clone()))
        .and_then(|b| b.set_override_option("forum.api_username", overrides.api_username.clone()))
        .and_then(|b| b.set_override_option("forum.category", overrides.category.map(|c| c as i64)))
        .and_then(|b| b.set_override_option("log_level", overrides.log_level.clone()))
        .map_err(settings_error)?
        .build()
        .map_err(settings_error)?;

    let mut config: SyncConfig = settings.try_deserialize().map_err(settings_error)?;
    config.forum.base_url = config.forum.base_url.trim_end_matches('/').to_string();
    config.validate()?;
    Ok(config)
}

fn settings_error(err: config::ConfigError) -> Error {
    Error::config_error(format!("Invalid settings: {}", err))
}

/// Write the starter configuration to `path`, refusing to clobber an
/// existing file unless `force` is set.
pub async fn init_settings_file(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config_error(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }
    SyncConfig::template().save(path).await?;
    log::info!("Wrote starter configuration to {}", path.display());
    Ok(())
}

/// YAML rendering of `config` with the API key masked
pub fn redacted_yaml(config: &SyncConfig) -> Result<String> {
    let mut shown = config.clone();
    shown.forum.api_key = "<redacted>".to_string();
    serde_yaml::to_string(&shown)
        .map_err(|e| Error::config_error(format!("Failed to render settings: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_yaml(dir: &TempDir, vault: &Path) -> PathBuf {
        let path = dir.path().join("vaultpost.yaml");
        std::fs::write(
            &path,
            format!(
                "vault:\n  path: {}\nforum:\n  base_url: https://file.example.com/\n  api_key: file-key\n  api_username: file-user\n  category: 5\n",
                vault.display()
            ),
        )
        .unwrap();
        path
    }

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_file_layer_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_yaml(&dir, dir.path());

        let config = load_settings_with_env(&path, &CliOverrides::default(), env(&[])).unwrap();
        assert_eq!(config.forum.base_url, "https://file.example.com");
        assert_eq!(config.forum.api_key, "file-key");
        assert_eq!(config.forum.category, 5);
        assert_eq!(config.forum.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.vault.max_asset_size, DEFAULT_MAX_ASSET_SIZE);
        assert!(config.vault.excluded_paths.contains(".obsidian"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_env_beats_file_and_cli_beats_env() {
        let dir = TempDir::new().unwrap();
        let path = write_yaml(&dir, dir.path());

        let config = load_settings_with_env(
            &path,
            &CliOverrides::default(),
            env(&[
                ("VAULTPOST_FORUM__API_KEY", "env-key"),
                ("VAULTPOST_FORUM__CATEGORY", "8"),
            ]),
        )
        .unwrap();
        assert_eq!(config.forum.api_key, "env-key");
        assert_eq!(config.forum.category, 8);

        let overrides = CliOverrides {
            category: Some(11),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        let config = load_settings_with_env(
            &path,
            &overrides,
            env(&[("VAULTPOST_FORUM__CATEGORY", "8")]),
        )
        .unwrap();
        assert_eq!(config.forum.category, 11);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_environment_only() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.yaml");

        let config = load_settings_with_env(
            &missing,
            &CliOverrides {
                vault_path: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            env(&[
                ("VAULTPOST_FORUM__BASE_URL", "http://localhost:4200"),
                ("VAULTPOST_FORUM__API_KEY", "k"),
                ("VAULTPOST_FORUM__API_USERNAME", "u"),
                ("VAULTPOST_FORUM__URL_FIELD", "short_url"),
            ]),
        )
        .unwrap();
        assert_eq!(config.forum.base_url, "http://localhost:4200");
        assert_eq!(config.forum.url_field, vaultpost_core::UrlField::ShortUrl);
    }

    #[test]
    fn test_missing_required_fields() {
        let dir = TempDir::new().unwrap();
        let err =
            load_settings_with_env(&dir.path().join("none.yaml"), &CliOverrides::default(), env(&[]))
                .unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vaultpost.yaml");

        init_settings_file(&path, false).await.unwrap();
        assert!(init_settings_file(&path, false).await.is_err());
        init_settings_file(&path, true).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("base_url: https://forum.example.com"));
    }

    #[test]
    fn test_redacted_yaml_hides_key() {
        let dir = TempDir::new().unwrap();
        let path = write_yaml(&dir, dir.path());
        let config = load_settings_with_env(&path, &CliOverrides::default(), env(&[])).unwrap();

        let shown = redacted_yaml(&config).unwrap();
        assert!(!shown.contains("file-key"));
        assert!(shown.contains("<redacted>"));
    }
}
