//! Binding configuration
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! root = "/spiffs"
//! namespace = "FS"
//! strict_modes = false
//! read_position = "ignore"   # or "honor"
//! load_chunk_size = 512
//! log_level = "info"         # none | error | warn | info | debug | verbose
//! ```

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use crate::logging;

/// Default unit size for `loadFile`
pub const DEFAULT_LOAD_CHUNK_SIZE: usize = 512;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown log level \"{0}\"")]
    InvalidLogLevel(String),

    #[error("load_chunk_size must be at least 1")]
    InvalidChunkSize,
}

/// What `readSync` does with its `position` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPosition {
    /// Accepted and ignored; reads use the descriptor's file pointer
    #[default]
    Ignore,
    /// Read at the given position with `pread`, leaving the file pointer alone
    Honor,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsConfig {
    /// Host directory caller paths resolve beneath
    pub root: PathBuf,

    /// Name the module registers under
    pub namespace: String,

    /// Reject unrecognized open modes instead of opening with flags 0
    pub strict_modes: bool,

    pub read_position: ReadPosition,

    /// Unit size for `loadFile`
    pub load_chunk_size: usize,

    pub log_level: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            namespace: "FS".to_string(),
            strict_modes: false,
            read_position: ReadPosition::Ignore,
            load_chunk_size: DEFAULT_LOAD_CHUNK_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl FsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: FsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builder: mount root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if logging::parse_level(&self.log_level).is_none() {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        if self.load_chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        Ok(())
    }

    /// Log filter for `log_level`; `Info` if the name is unknown
    pub fn level_filter(&self) -> LevelFilter {
        logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FsConfig::from_toml_str("").unwrap();
        assert_eq!(config, FsConfig::default());
        assert_eq!(config.namespace, "FS");
        assert!(!config.strict_modes);
        assert_eq!(config.read_position, ReadPosition::Ignore);
        assert_eq!(config.load_chunk_size, 512);
        assert_eq!(config.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_full_file() {
        let config = FsConfig::from_toml_str(
            r#"
root = "/spiffs"
namespace = "fs"
strict_modes = true
read_position = "honor"
load_chunk_size = 64
log_level = "verbose"
"#,
        )
        .unwrap();

        assert_eq!(config.root, PathBuf::from("/spiffs"));
        assert_eq!(config.namespace, "fs");
        assert!(config.strict_modes);
        assert_eq!(config.read_position, ReadPosition::Honor);
        assert_eq!(config.load_chunk_size, 64);
        assert_eq!(config.level_filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            FsConfig::from_toml_str("log_level = \"loud\""),
            Err(ConfigError::InvalidLogLevel(level)) if level == "loud"
        ));
        assert!(matches!(
            FsConfig::from_toml_str("load_chunk_size = 0"),
            Err(ConfigError::InvalidChunkSize)
        ));
        assert!(matches!(
            FsConfig::from_toml_str("read_position = \"seek\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            FsConfig::from_toml_str("mystery = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsbind.toml");
        std::fs::write(&path, "strict_modes = true\n").unwrap();

        let config = FsConfig::load(&path).unwrap();
        assert!(config.strict_modes);

        let missing = FsConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
