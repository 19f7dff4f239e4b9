use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub network: Option<NetworkConfig>,
    pub search: Option<SearchConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub request_delay_secs: Option<f64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub enabled: Option<bool>,
    pub url: Option<String>,
}

/// Platform config directory path: `<config_dir>/citecheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citecheck").join("config.toml"))
}

/// Load config by cascading CWD `.citecheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citecheck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        network: Some(NetworkConfig {
            connect_timeout_secs: overlay
                .network
                .as_ref()
                .and_then(|n| n.connect_timeout_secs)
                .or_else(|| base.network.as_ref().and_then(|n| n.connect_timeout_secs)),
            request_delay_secs: overlay
                .network
                .as_ref()
                .and_then(|n| n.request_delay_secs)
                .or_else(|| base.network.as_ref().and_then(|n| n.request_delay_secs)),
            user_agent: overlay
                .network
                .as_ref()
                .and_then(|n| n.user_agent.clone())
                .or_else(|| base.network.as_ref().and_then(|n| n.user_agent.clone())),
        }),
        search: Some(SearchConfig {
            enabled: overlay
                .search
                .as_ref()
                .and_then(|s| s.enabled)
                .or_else(|| base.search.as_ref().and_then(|s| s.enabled)),
            url: overlay
                .search
                .as_ref()
                .and_then(|s| s.url.clone())
                .or_else(|| base.search.as_ref().and_then(|s| s.url.clone())),
        }),
    }
}

impl ConfigFile {
    /// Produce a runtime [`Config`], filling unset fields from defaults.
    pub fn runtime_config(&self) -> Config {
        let mut config = Config::default();
        if let Some(ref network) = self.network {
            if let Some(secs) = network.connect_timeout_secs {
                config.connect_timeout = std::time::Duration::from_secs(secs);
            }
            if let Some(secs) = network.request_delay_secs {
                config.request_delay = std::time::Duration::from_secs_f64(secs.max(0.0));
            }
            if let Some(ref ua) = network.user_agent {
                config.user_agent = ua.clone();
            }
        }
        if let Some(ref search) = self.search {
            if let Some(enabled) = search.enabled {
                config.enable_search = enabled;
            }
            if let Some(ref url) = search.url {
                config.search_url = url.clone();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_partial_config() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [network]
            connect_timeout_secs = 5
            "#,
        )
        .unwrap();
        let config = parsed.runtime_config();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        // Unset fields keep their defaults.
        assert_eq!(config.request_delay, Duration::from_secs(1));
        assert!(!config.enable_search);
    }

    #[test]
    fn merge_overlay_wins() {
        let base: ConfigFile = toml::from_str(
            r#"
            [network]
            connect_timeout_secs = 5
            request_delay_secs = 2.0
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [network]
            connect_timeout_secs = 9
            [search]
            enabled = true
            "#,
        )
        .unwrap();
        let merged = merge(base, overlay);
        let config = merged.runtime_config();
        assert_eq!(config.connect_timeout, Duration::from_secs(9));
        assert_eq!(config.request_delay, Duration::from_secs(2));
        assert!(config.enable_search);
    }

    #[test]
    fn unparseable_file_is_ignored() {
        assert!(load_from_path(Path::new("/nonexistent/citecheck.toml")).is_none());
    }

    #[test]
    fn fractional_delay_seconds() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [network]
            request_delay_secs = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.runtime_config().request_delay,
            Duration::from_millis(500)
        );
    }
}
