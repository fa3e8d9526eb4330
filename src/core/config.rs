//! Runtime configuration, loadable from TOML
//!
//! ```toml
//! root_dir = "assets/blobs"
//! extension = "rblob"
//! memory_map = true
//! verify_checksums = false
//! ```

use crate::blob::LoadOptions;
use crate::error::{BlobError, Result};
use crate::store::{DirectoryStore, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding `{archive:04}/{file:08}.{extension}` files
    pub root_dir: PathBuf,

    /// File extension of blob files, without the dot
    pub extension: String,

    /// Memory-map blob files instead of reading them. The files must stay
    /// unchanged while they are loaded.
    pub memory_map: bool,

    /// Verify body checksums on load
    pub verify_checksums: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            root_dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            memory_map: false,
            verify_checksums: true,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RuntimeConfig =
            toml::from_str(text).map_err(|e| BlobError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| BlobError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.contains(&['/', '\\', '.'][..]) {
            return Err(BlobError::Config(format!(
                "invalid blob extension: {:?}",
                self.extension
            )));
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            verify_checksum: self.verify_checksums,
            memory_map: self.memory_map,
        }
    }

    /// Directory store described by this configuration.
    pub fn directory_store(&self) -> DirectoryStore {
        DirectoryStore::new(&self.root_dir)
            .with_extension(self.extension.clone())
            .with_memory_map(self.memory_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.extension, "rblob");
        assert!(!config.memory_map);
        assert!(config.verify_checksums);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RuntimeConfig::from_toml_str("root_dir = \"/srv/blobs\"\nmemory_map = true\n")
            .unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/srv/blobs"));
        assert!(config.memory_map);
        assert!(config.verify_checksums);
        assert_eq!(config.extension, "rblob");

        let options = config.load_options();
        assert!(options.memory_map);
        assert!(options.verify_checksum);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            RuntimeConfig::from_toml_str("memory_map = \"yes\""),
            Err(BlobError::Config(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_toml_str("extension = \".bin\""),
            Err(BlobError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resources.toml");

        let mut config = RuntimeConfig::default();
        config.root_dir = dir.path().to_path_buf();
        config.extension = "bin".to_string();
        fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.directory_store().path_for(crate::file_id::FileId::new(1, 2)),
            dir.path().join("0001").join("00000002.bin")
        );
    }
}
