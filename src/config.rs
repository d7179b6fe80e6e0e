//! JSON configuration for building an [`Engine`](crate::engine::Engine).

use chunkview_common::chunk::{CHUNK_SIZE, DEFAULT_TILE_SIZE};
use chunkview_common::{ChunkviewError, Result};
use chunkview_logger::LogSeverity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Legacy id mapping file. The bundled table is used when unset.
    pub mapping_path: Option<PathBuf>,
    /// Block color file. The bundled table is used when unset.
    pub colors_path: Option<PathBuf>,
    pub log_level: String,
    pub render: RenderOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Composite water over the terrain below it.
    pub water: bool,
    /// Tile edge in pixels.
    pub tile_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mapping_path: None,
            colors_path: None,
            log_level: LogSeverity::Info.to_string().to_lowercase(),
            render: RenderOptions::default(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            water: true,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.log_severity()?;
        let size = self.render.tile_size;
        if size == 0 || size % CHUNK_SIZE != 0 {
            return Err(ChunkviewError::ConfigError(format!(
                "tile_size must be a positive multiple of {}, got {}",
                CHUNK_SIZE, size
            )));
        }
        Ok(())
    }

    pub fn log_severity(&self) -> Result<LogSeverity> {
        self.log_level
            .parse()
            .map_err(|e| ChunkviewError::ConfigError(format!("{}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_severity().unwrap(), LogSeverity::Info);
        assert!(config.render.water);
        assert_eq!(config.render.tile_size, 512);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{
                "mapping_path": "mapping/block_name_to_id.txt",
                "log_level": "debug",
                "render": { "water": false, "tile_size": 256 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.mapping_path, Some(PathBuf::from("mapping/block_name_to_id.txt")));
        assert_eq!(config.colors_path, None);
        assert_eq!(config.log_severity().unwrap(), LogSeverity::Debug);
        assert_eq!(config.render, RenderOptions { water: false, tile_size: 256 });
    }

    #[test]
    fn test_rejections() {
        assert_matches!(Config::from_json(r#"{"colour": 1}"#), Err(ChunkviewError::ConfigError(_)));
        assert_matches!(Config::from_json(r#"{"log_level": "loud"}"#), Err(ChunkviewError::ConfigError(_)));
        assert_matches!(
            Config::from_json(r#"{"render": {"tile_size": 100}}"#),
            Err(ChunkviewError::ConfigError(_))
        );
        assert_matches!(Config::from_json("not json"), Err(ChunkviewError::ConfigError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        assert_matches!(Config::load("/nonexistent/chunkview.json"), Err(ChunkviewError::IoError(_)));
    }
}
