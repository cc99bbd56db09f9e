//! Configuration loader for Chat Bridge.
//!
//! Reads `chatbridge.toml` and deserializes it into [`BridgeConfig`]. Falls
//! back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use chatbridge_types::config::BridgeConfig;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "chatbridge.toml";

/// The config path to use: the explicit one, or `./chatbridge.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration from `path`.
///
/// - Missing file: [`BridgeConfig::default()`].
/// - Unreadable or malformed file: logs a warning and returns the default.
pub async fn load_config(path: &Path) -> BridgeConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return BridgeConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return BridgeConfig::default();
        }
    };

    match toml::from_str::<BridgeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            BridgeConfig::default()
        }
    }
}
