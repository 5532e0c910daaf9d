//! Provider and agent configuration
//!
//! Every command runs one load → mutate → save cycle against a single YAML
//! file. There is no locking: two commands writing at once race and the last
//! writer wins.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod codec;
mod error;
mod types;
mod upsert;

pub use codec::{decode, encode, Decoded};
pub use error::ConfigError;
pub use types::{Agent, ConfigDocument, ProviderConfig, ProviderKind};
pub use upsert::{
    upsert_agent, upsert_provider_config, AgentResolution, ConflictResolver, ProviderResolution,
    UpsertOutcome, Upserted, MAX_RENAME_ATTEMPTS,
};

#[cfg(test)]
pub(crate) use upsert::tests::ScriptedResolver;

/// Environment variable holding an explicit config file path
pub const ENV_CONFIG_FILE: &str = "AICRAFT_CONFIG";

const CONFIG_DIR_NAME: &str = ".aicraft";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Handle to the configuration file on disk
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Open the store at `$AICRAFT_CONFIG`, or the per-user default path
    pub fn open() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(ENV_CONFIG_FILE) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => Self::default_path()?,
        };
        Ok(Self::open_at(path))
    }

    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, migrating the legacy layout in place
    ///
    /// Never fails: a missing file is an empty document, and an unreadable or
    /// malformed one is reported with a warning and treated as empty.
    pub fn load(&self) -> ConfigDocument {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                eprintln!("Warning: {} (starting from an empty configuration)", e);
                ConfigDocument::default()
            }
        }
    }

    /// Read the document, surfacing decode failures
    pub fn try_load(&self) -> Result<ConfigDocument, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file yet");
                return Ok(ConfigDocument::default());
            }
            Err(source) => {
                return Err(ConfigError::Persistence {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let decoded = decode(&bytes).map_err(|source| ConfigError::Decode {
            path: self.path.clone(),
            source,
        })?;

        if decoded.migrated {
            info!(path = %self.path.display(), "migrating config to the current format");
            if let Err(e) = self.save(&decoded.document) {
                warn!(error = %e, "could not write migrated config");
            }
        }

        Ok(decoded.document)
    }

    /// Write the whole document, owner read/write only
    pub fn save(&self, doc: &ConfigDocument) -> Result<(), ConfigError> {
        let text = encode(doc).map_err(ConfigError::Encode)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.persistence(source))?;
            }
        }

        let mut file = open_private(&self.path).map_err(|source| self.persistence(source))?;
        file.write_all(text.as_bytes())
            .map_err(|source| self.persistence(source))?;
        restrict_permissions(&self.path).map_err(|source| self.persistence(source))?;

        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    fn persistence(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// `mode` only applies on creation; an older file may be wider
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
