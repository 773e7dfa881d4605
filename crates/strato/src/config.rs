//! Runtime startup configuration.
//!
//! Loaded once at startup from a TOML file when one is present; every
//! field has a default so a missing file or a partial file still yields
//! a usable runtime.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use strato_rendering::RenderConfig;

/// Failures while reading the startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// The path that failed.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Runtime configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Frame rate the render thread and the main loop pace to.
    pub target_fps: u32,
    /// Design-time surface width.
    pub design_width: u32,
    /// Design-time surface height.
    pub design_height: u32,
    /// Shared API request budget per one-second window.
    pub max_requests_per_second: u32,
    /// Directory for app-visible data.
    pub data_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            design_width: 1080,
            design_height: 1920,
            max_requests_per_second: 1000,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl RuntimeConfig {
    /// Reads a configuration file. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The render-pipeline view of this configuration.
    #[must_use]
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            design_width: self.design_width,
            design_height: self.design_height,
            target_fps: self.target_fps,
            ..RenderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.design_width, 1080);
        assert_eq!(config.design_height, 1920);
        assert_eq!(config.max_requests_per_second, 1000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strato.toml");
        std::fs::write(&path, "target_fps = 30\n").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.design_width, 1080);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strato.toml");
        std::fs::write(&path, "frames_per_second = 30\n").unwrap();

        assert!(matches!(
            RuntimeConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            RuntimeConfig::load(Path::new("/nonexistent/strato.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_render_config_projection() {
        let config = RuntimeConfig {
            target_fps: 30,
            design_width: 720,
            design_height: 1280,
            ..RuntimeConfig::default()
        };
        let render = config.render_config();
        assert_eq!(render.target_fps, 30);
        assert_eq!(render.design_width, 720);
        assert_eq!(render.design_height, 1280);
    }
}
