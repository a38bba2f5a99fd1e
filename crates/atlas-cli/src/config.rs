//! Locating and reading the CLI configuration file.
//!
//! A configuration is taken from the first [`ConfigSource`] that exists:
//! the `--config` path, `atlas/config.toml` in the working directory, the
//! platform config directory, and finally the built-in defaults. A file that
//! is found is parsed and validated up front so that bad values are reported
//! against the file they came from.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use atlas::{AtlasError, config::AppConfig};

const LOCAL_CONFIG: &str = "atlas/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for AtlasError {
    fn from(err: ConfigError) -> Self {
        AtlasError::Config(err.to_string())
    }
}

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line; must exist.
    Explicit(PathBuf),
    /// `atlas/config.toml` under the working directory.
    Local(PathBuf),
    /// `config.toml` in the platform config directory.
    System(PathBuf),
    Default,
}

impl ConfigSource {
    /// Picks the source to load from.
    pub fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::Local(local);
        }

        match ProjectDirs::from("com", "atlas", "atlas") {
            Some(dirs) => {
                let system = dirs.config_dir().join("config.toml");
                if system.is_file() {
                    return Self::System(system);
                }
                debug!(path:? = system; "No system configuration file");
            }
            None => debug!("Platform config directory unavailable"),
        }

        Self::Default
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::System(path) => Some(path),
            Self::Default => None,
        }
    }

    /// Reads, parses and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Config`] when an explicit file is missing, or a
    /// file does not parse or holds invalid values, and [`AtlasError::Io`]
    /// when it cannot be read.
    pub fn load(&self) -> Result<AppConfig, AtlasError> {
        let Some(path) = self.path() else {
            debug!("Using default configuration");
            return Ok(AppConfig::default());
        };
        info!(path:? = path, source:? = self; "Loading configuration");

        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()).into());
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })?;
        config.validate().map_err(|err| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: match err {
                AtlasError::Config(message) => message,
                other => other.to_string(),
            },
        })?;

        Ok(config)
    }
}

/// Loads the configuration from the first available [`ConfigSource`].
///
/// # Errors
///
/// See [`ConfigSource::load`].
pub fn load_config(explicit: Option<impl AsRef<Path>>) -> Result<AppConfig, AtlasError> {
    let explicit: Option<&Path> = explicit.as_ref().map(|path| path.as_ref());
    ConfigSource::locate(explicit).load()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let source = ConfigSource::locate(Some(Path::new("elsewhere.toml")));

        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("elsewhere.toml")));
        assert_eq!(source.path(), Some(Path::new("elsewhere.toml")));
    }

    #[test]
    fn test_default_source_loads_defaults() {
        let config = ConfigSource::Default.load().unwrap();

        assert_eq!(config.layout(), AppConfig::default().layout());
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nregion_size = 40.0\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout().region_size(), 40.0);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();

        assert!(matches!(err, AtlasError::Config(_)));
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nregion_size = \"wide\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }

    #[test]
    fn test_invalid_values_name_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nregion_size = -4.0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid configuration"), "{message}");
        assert!(message.contains("config.toml"), "{message}");
    }
}
