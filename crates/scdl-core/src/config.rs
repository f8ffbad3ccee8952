use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::transport::DEFAULT_MAX_CONNECTIONS;

/// Global configuration loaded from `~/.config/scdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScdlConfig {
    /// Maximum simultaneous HTTP connections (probes + transfers).
    pub max_connections: usize,
    /// Default destination directory; the current directory when unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Download one track fully before starting the next.
    #[serde(default)]
    pub one_track_at_a_time: bool,
    /// Keep only the first track of each page.
    #[serde(default)]
    pub only_main_track: bool,
    pub connect_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// Transfers slower than this (bytes/s) for `low_speed_time_secs` are aborted.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ScdlConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            download_dir: None,
            one_track_at_a_time: false,
            only_main_track: false,
            connect_timeout_secs: 30,
            probe_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            user_agent: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("scdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ScdlConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ScdlConfig::default();
        assert_eq!(cfg.max_connections, 50);
        assert!(cfg.download_dir.is_none());
        assert!(!cfg.one_track_at_a_time);
        assert!(!cfg.only_main_track);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ScdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ScdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.max_connections, cfg.max_connections);
        assert_eq!(parsed.connect_timeout_secs, cfg.connect_timeout_secs);
        assert_eq!(parsed.low_speed_limit_bytes, cfg.low_speed_limit_bytes);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            max_connections = 8
            connect_timeout_secs = 10
            probe_timeout_secs = 5
            low_speed_limit_bytes = 512
            low_speed_time_secs = 30
            download_dir = "/music/SC tracks"
            one_track_at_a_time = true
        "#;
        let cfg: ScdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_connections, 8);
        assert_eq!(cfg.probe_timeout_secs, 5);
        assert_eq!(cfg.download_dir, Some(PathBuf::from("/music/SC tracks")));
        assert!(cfg.one_track_at_a_time);
        assert!(!cfg.only_main_track);
        assert!(cfg.user_agent.is_none());
    }
}
