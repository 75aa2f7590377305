// THEORY:
// The config store persists `ThresholdBounds` between sessions as a flat JSON
// record. Absence of the file is the normal first-run case and yields the
// default (widest) bounds. A file that exists but cannot be decoded is a hard
// error: continuing with zeroed thresholds would silently track nothing.

use crate::core_modules::bounds::ThresholdBounds;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const INDENT: &[u8] = b"    ";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("malformed threshold config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot read threshold config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write threshold config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

/// Loads bounds from `path`, falling back to the defaults when the file does
/// not exist.
pub fn load(path: impl AsRef<Path>) -> Result<ThresholdBounds, ConfigError> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("no config at {}, using default bounds", path.display());
            return Ok(ThresholdBounds::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let bounds = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded bounds from {}", path.display());
    Ok(bounds)
}

/// Overwrites `path` with an indented JSON record of `bounds`.
pub fn save(path: impl AsRef<Path>, bounds: &ThresholdBounds) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let mut encoded = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut encoded, PrettyFormatter::with_indent(INDENT));
    bounds.serialize(&mut serializer)?;

    fs::write(path, encoded).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved bounds to {}", path.display());
    Ok(())
}

/// A config file location, owned by the main loop for the whole session.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ThresholdBounds, ConfigError> {
        load(&self.path)
    }

    pub fn save(&self, bounds: &ThresholdBounds) -> Result<(), ConfigError> {
        save(&self.path, bounds)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}
