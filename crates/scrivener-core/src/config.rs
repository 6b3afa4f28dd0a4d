//! Engine-initialization configuration.
//!
//! Cache/robots/detection TTLs are configurable via an engine-initialization
//! struct. [`EngineConfig`] is that struct: it can be constructed with
//! [`EngineConfig::default`] directly by a front end, or loaded from a TOML
//! file on disk for front ends that want a config file.
//!
//! ## File Location
//!
//! - XDG: `$XDG_CONFIG_HOME/scrivener/config.toml` or `~/.config/scrivener/config.toml`
//! - Dotfile fallback: `~/.scrivener/config.toml`
//!
//! A `config.local.toml` in the same directory overrides keys from `config.toml`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine-wide configuration: cache TTLs/caps, robots policy, detection
/// thresholds, and fetch timeouts.
///
/// ## Example Configuration File
///
/// ```toml
/// [cache]
/// success_ttl_secs = 300
/// error_ttl_secs = 30
/// content_memory_cap_bytes = 67108864
/// probe_count_cap = 1000
/// detections_ttl_secs = 600
///
/// [robots]
/// enabled = true
/// ttl_secs = 3600
/// host_count_cap = 500
/// fetch_timeout_secs = 5
///
/// [detection]
/// confidence_threshold = 0.5
/// url_pattern_fallbacks = ["/en/latest/", "/latest/", "/en/stable/", "/stable/", "/main/", "/master/"]
///
/// [fetch]
/// user_agent = "scrivener/0.1.0"
/// probe_timeout_secs = 10
/// retrieve_timeout_secs = 30
/// max_concurrent_extractions = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Content/probe cache tuning.
    pub cache: CacheConfig,
    /// Robots compliance tuning.
    pub robots: RobotsConfig,
    /// Detection orchestrator tuning.
    pub detection: DetectionConfig,
    /// HTTP cache proxy tuning.
    pub fetch: FetchConfig,
}

/// Cache TTLs and eviction caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for successful cache entries, in seconds.
    pub success_ttl_secs: u64,
    /// TTL for negative (error) cache entries, in seconds.
    pub error_ttl_secs: u64,
    /// Total memory budget for the content cache, in bytes.
    pub content_memory_cap_bytes: u64,
    /// Entry-count cap for the probe cache.
    pub probe_count_cap: usize,
    /// TTL for detections-cache entries, in seconds.
    pub detections_ttl_secs: u64,
}

impl CacheConfig {
    /// `success_ttl_secs` as a [`Duration`].
    #[must_use]
    pub const fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.success_ttl_secs)
    }

    /// `error_ttl_secs` as a [`Duration`].
    #[must_use]
    pub const fn error_ttl(&self) -> Duration {
        Duration::from_secs(self.error_ttl_secs)
    }

    /// `detections_ttl_secs` as a [`Duration`].
    #[must_use]
    pub const fn detections_ttl(&self) -> Duration {
        Duration::from_secs(self.detections_ttl_secs)
    }
}

/// Robots compliance tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsConfig {
    /// Whether robots.txt is consulted at all; disabling is for test fixtures only.
    pub enabled: bool,
    /// TTL for a cached robots policy, in seconds.
    pub ttl_secs: u64,
    /// Entry-count cap for the robots cache (hosts).
    pub host_count_cap: usize,
    /// Timeout for fetching `robots.txt` itself, in seconds.
    pub fetch_timeout_secs: u64,
}

impl RobotsConfig {
    /// `ttl_secs` as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// `fetch_timeout_secs` as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Detection orchestrator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum confidence for a detection to be selected without pattern fallback.
    pub confidence_threshold: f64,
    /// Ordered URL-pattern suffixes tried when no processor meets the threshold.
    pub url_pattern_fallbacks: Vec<String>,
}

/// HTTP cache proxy tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-agent string sent on every outbound request.
    pub user_agent: String,
    /// Timeout for `probe` (HEAD) requests, in seconds.
    pub probe_timeout_secs: u64,
    /// Timeout for `retrieve_*` (GET) requests, in seconds.
    pub retrieve_timeout_secs: u64,
    /// Bounded fan-out for parallel content extraction.
    pub max_concurrent_extractions: usize,
}

impl FetchConfig {
    /// `probe_timeout_secs` as a [`Duration`].
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// `retrieve_timeout_secs` as a [`Duration`].
    #[must_use]
    pub const fn retrieve_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieve_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig {
                success_ttl_secs: 300,
                error_ttl_secs: 30,
                content_memory_cap_bytes: 64 * 1024 * 1024,
                probe_count_cap: 1000,
                detections_ttl_secs: 600,
            },
            robots: RobotsConfig {
                enabled: true,
                ttl_secs: 3600,
                host_count_cap: 500,
                fetch_timeout_secs: 5,
            },
            detection: DetectionConfig {
                confidence_threshold: 0.5,
                url_pattern_fallbacks: vec![
                    "/en/latest/".to_string(),
                    "/latest/".to_string(),
                    "/en/stable/".to_string(),
                    "/stable/".to_string(),
                    "/main/".to_string(),
                    "/master/".to_string(),
                ],
            },
            fetch: FetchConfig {
                user_agent: format!("scrivener/{}", env!("CARGO_PKG_VERSION")),
                probe_timeout_secs: 10,
                retrieve_timeout_secs: 30,
                max_concurrent_extractions: 10,
            },
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default location, falling back to
    /// [`EngineConfig::default`] if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let base_path = Self::existing_config_path()?;

        let mut base_value: toml::Value = if let Some(ref path) = base_path {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
            toml::from_str(&content)?
        } else {
            let default_str = toml::to_string(&Self::default())?;
            toml::from_str(&default_str)?
        };

        let base_dir = base_path.as_deref().map_or_else(
            || {
                Self::canonical_config_path()
                    .map(|p| p.parent().map(Path::to_path_buf).unwrap_or_default())
                    .unwrap_or_default()
            },
            |bp| bp.parent().map(Path::to_path_buf).unwrap_or_default(),
        );

        let local_path = base_dir.join("config.local.toml");
        if local_path.exists() {
            let content = fs::read_to_string(&local_path)
                .map_err(|e| Error::Config(format!("Failed to read local config: {e}")))?;
            let local_value: toml::Value = toml::from_str(&content)?;
            Self::merge_toml(&mut base_value, &local_value);
        }

        let config: Self = base_value
            .try_into()
            .map_err(|e| Error::Config(format!("Failed to materialize config: {e}")))?;
        Ok(config)
    }

    /// Load configuration from an explicit path, bypassing XDG/dotfile lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as valid
    /// [`EngineConfig`] TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        Ok(toml::from_str(&content)?)
    }

    /// Save the configuration to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, parent
    /// directories cannot be created, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::save_target_path()?;
        let parent = config_path
            .parent()
            .ok_or_else(|| Error::Config("Invalid config path".into()))?;
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    fn canonical_config_path() -> Result<PathBuf> {
        let xdg = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| directories::BaseDirs::new().map(|b| b.home_dir().join(".config")))
            .ok_or_else(|| Error::Config("Failed to determine XDG config directory".into()))?;
        Ok(xdg.join("scrivener").join("config.toml"))
    }

    fn dotfile_config_path() -> Result<PathBuf> {
        let home = directories::BaseDirs::new()
            .map(|b| b.home_dir().to_path_buf())
            .ok_or_else(|| Error::Config("Failed to determine home directory".into()))?;
        Ok(home.join(".scrivener").join("config.toml"))
    }

    fn existing_config_path() -> Result<Option<PathBuf>> {
        if let Ok(explicit) = std::env::var("SCRIVENER_CONFIG") {
            let explicit = explicit.trim();
            if !explicit.is_empty() {
                let p = PathBuf::from(explicit);
                if p.is_file() {
                    return Ok(Some(p));
                }
            }
        }
        if let Ok(dir) = std::env::var("SCRIVENER_CONFIG_DIR") {
            let dir = dir.trim();
            if !dir.is_empty() {
                let p = PathBuf::from(dir).join("config.toml");
                if p.is_file() {
                    return Ok(Some(p));
                }
            }
        }
        let xdg = Self::canonical_config_path()?;
        if xdg.exists() {
            return Ok(Some(xdg));
        }
        let dot = Self::dotfile_config_path()?;
        if dot.exists() {
            return Ok(Some(dot));
        }
        Ok(None)
    }

    fn save_target_path() -> Result<PathBuf> {
        if let Some(existing) = Self::existing_config_path()? {
            return Ok(existing);
        }
        Self::canonical_config_path()
    }

    fn merge_toml(dst: &mut toml::Value, src: &toml::Value) {
        use toml::Value::Table;
        match (dst, src) {
            (Table(dst_tbl), Table(src_tbl)) => {
                for (k, v) in src_tbl {
                    match dst_tbl.get_mut(k) {
                        Some(dst_v) => Self::merge_toml(dst_v, v),
                        None => {
                            dst_tbl.insert(k.clone(), v.clone());
                        },
                    }
                }
            },
            (dst_v, src_v) => *dst_v = src_v.clone(),
        }
    }
}
