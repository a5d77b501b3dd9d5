use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::io::Serializable;

/// Runtime settings, read from a JSON file. Every field has a default so a partial file is fine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory whose subdirectories are asset packs
    pub domains_root: PathBuf,
    /// `env_logger` filter, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Seconds simulated per frame
    pub frame_delta: f32,
    pub frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            domains_root: PathBuf::from("demos/domains"),
            log_filter: "info".to_string(),
            frame_delta: 1.0 / 60.0,
            frames: 120,
        }
    }
}

impl EngineConfig {
    /// Reads the config at `path`, or `None` if there is no file there.
    pub fn load_if_present<P: AsRef<Path>>(path: P) -> Result<Option<EngineConfig>, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        EngineConfig::load(path).map(Some)
    }

    /// Reads the config at `path`, or returns the defaults if there is no file there.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<EngineConfig, LoadError> {
        Ok(EngineConfig::load_if_present(path)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(dir.path().join("nexus.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexus.json");
        assert_eq!(EngineConfig::load_if_present(&path).unwrap(), None);

        EngineConfig::default().save(&path).unwrap();
        assert_eq!(EngineConfig::load_if_present(&path).unwrap(), Some(EngineConfig::default()));
    }

    #[test]
    fn partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexus.json");
        fs::write(&path, r#"{"frames": 3, "domains_root": "assets"}"#).unwrap();

        let config = EngineConfig::load_or_default(&path).unwrap();

        assert_eq!(config.frames, 3);
        assert_eq!(config.domains_root, PathBuf::from("assets"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexus.json");
        fs::write(&path, "{").unwrap();

        assert!(matches!(EngineConfig::load_or_default(&path), Err(LoadError::Json { .. })));
    }
}
