use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// CLI configuration loaded from `erdsync.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub cli: CliSettings,
}

/// Timing of the watch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Poll interval, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(default = "default_diagram_dir")]
    pub default_diagram_dir: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            default_diagram_dir: default_diagram_dir(),
            extensions: default_extensions(),
        }
    }
}

impl CliSettings {
    /// The paths to search: the given ones, or the configured default directory.
    pub fn paths_or_default(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        if paths.is_empty() {
            vec![PathBuf::from(&self.default_diagram_dir)]
        } else {
            paths.to_vec()
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_poll_ms() -> u64 {
    100
}

fn default_diagram_dir() -> String {
    "diagrams/".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["mmd".to_string(), "erd".to_string()]
}

/// Discovery order for the config file:
/// 1. `--config <path>` (explicit, also fed by `ERDSYNC_CONFIG`)
/// 2. `ERDSYNC_CONFIG` env var, if the file exists
/// 3. `./erdsync.toml` (project-local)
/// 4. `$XDG_CONFIG_HOME/erdsync/config.toml`
/// 5. `~/.config/erdsync/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    if let Ok(env_path) = std::env::var("ERDSYNC_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    let local = PathBuf::from("erdsync.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("erdsync/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/erdsync/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(CliConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    tracing::debug!(path = %path.display(), "loading config");
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CliConfig::default();
        assert_eq!(config.sync.debounce_ms, 300);
        assert_eq!(config.sync.poll_ms, 100);
        assert_eq!(config.cli.default_diagram_dir, "diagrams/");
        assert_eq!(config.cli.extensions, ["mmd", "erd"]);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
[sync]
debounce_ms = 50
"#;
        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sync.debounce(), Duration::from_millis(50));
        assert_eq!(config.sync.poll_ms, 100);
        assert_eq!(config.cli.default_diagram_dir, "diagrams/");
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[sync]
debounce_ms = 500
poll_ms = 250

[cli]
default_diagram_dir = "docs/er/"
extensions = ["mermaid"]
"#;
        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sync.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.cli.default_diagram_dir, "docs/er/");
        assert_eq!(config.cli.extensions, ["mermaid"]);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.sync.debounce_ms, 300);
        assert_eq!(config.cli.extensions.len(), 2);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let sync = SyncConfig {
            debounce_ms: 0,
            poll_ms: 0,
        };
        assert_eq!(sync.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn paths_fall_back_to_default_dir() {
        let settings = CliSettings::default();
        assert_eq!(
            settings.paths_or_default(&[]),
            vec![PathBuf::from("diagrams/")]
        );
        let given = vec![PathBuf::from("x.mmd")];
        assert_eq!(settings.paths_or_default(&given), given);
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("erdsync.toml");
        std::fs::write(&path, "[cli]\nextensions = [\"er\"]\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.cli.extensions, ["er"]);
    }

    #[test]
    fn load_config_missing_explicit_path_is_io_error() {
        let result = load_config(Some(Path::new("/nonexistent/erdsync.toml")));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[sync\ndebounce_ms = ").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(CliError::Config { .. })
        ));
    }
}
