/// Configuration loading: an optional TOML file that tunes which
/// directories the desktop backends treat as storage roots.
///
/// A missing file at the default location is not an error; callers fall
/// back to `Config::default()`. A path the user named explicitly must exist.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories always reported as roots, ahead of anything discovered.
    pub extra_roots: Vec<PathBuf>,
    /// Report the user's home (or app sandbox) directory as a root.
    pub include_home: bool,
    /// Mount points under these prefixes count as external media (Linux).
    pub mount_prefixes: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extra_roots: Vec::new(),
            include_home: true,
            mount_prefixes: ["/media", "/run/media", "/mnt"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load(config_path).map(Some)
    }

    /// Load `config_path`, which must exist.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Load the explicitly given `path`, or [`Config::config_path`] when
    /// `None`. Only the implicit default may be absent.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::load_from_path(Self::config_path())?.unwrap_or_default()),
        }
    }

    /// Parse TOML text, expanding `~` and `$VARS` in every configured path.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        for path in config
            .extra_roots
            .iter_mut()
            .chain(config.mount_prefixes.iter_mut())
        {
            if let Some(expanded) = Self::expand_path(path) {
                *path = expanded;
            }
        }
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/storesleuth");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(e) => {
                tracing::warn!("Leaving {} unexpanded: {e}", path.display());
                None
            }
        }
    }
}
