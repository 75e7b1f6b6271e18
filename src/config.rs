// src/config.rs

//! Configuration for the raster demo and for callers that want sensible
//! defaults for framebuffers and shading passes.
//!
//! Every struct deserializes with `#[serde(default)]`, so a configuration
//! file only needs to name the settings it changes. Files are JSON.

use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::color::{PixelFormat, Rgb};
use crate::shader::{RenderOptions, ShaderFlags};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PIXELFLOW_RASTER_CONFIG";

/// Process-wide configuration, loaded on first use from [`CONFIG_ENV_VAR`].
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// The complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Framebuffer settings.
    pub bitmap: BitmapConfig,
    /// Parallelism settings.
    pub render: RenderConfig,
    /// Shading settings.
    pub shader: ShaderConfig,
}

// --- Bitmap Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitmapConfig {
    /// Pixel format of newly created framebuffers.
    pub format: PixelFormat,
    /// Color used by `Bitmap::clear`.
    pub clear_color: Rgb,
    pub width: u32,
    pub height: u32,
}

impl Default for BitmapConfig {
    fn default() -> Self {
        BitmapConfig {
            format: PixelFormat::Xrgb8888,
            clear_color: Rgb::BLACK,
            width: 320,
            height: 240,
        }
    }
}

// --- Render Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RenderConfig {
    /// Shading threads. 0 uses one per available core.
    pub threads: usize,
}

impl RenderConfig {
    pub fn options(&self) -> RenderOptions {
        RenderOptions::with_threads(self.threads)
    }
}

// --- Shader Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShaderConfig {
    /// Fragment coordinate convention.
    pub flags: ShaderFlags,
}

impl Config {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Failed to parse configuration")
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load the file named by [`CONFIG_ENV_VAR`], or fall back to defaults.
    ///
    /// A missing variable is not an error. An unreadable or invalid file is
    /// logged and replaced by the defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Config::default();
        };
        match Config::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                warn!("{:#}; using default configuration", e);
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bitmap.format, PixelFormat::Xrgb8888);
        assert_eq!(config.bitmap.clear_color, Rgb::BLACK);
        assert_eq!((config.bitmap.width, config.bitmap.height), (320, 240));
        assert_eq!(config.render.threads, 0);
        assert_eq!(config.shader.flags, ShaderFlags::STANDARD);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = Config::from_json(r#"{ "bitmap": { "format": "Rgb565", "width": 64 } }"#).unwrap();
        assert_eq!(config.bitmap.format, PixelFormat::Rgb565);
        assert_eq!(config.bitmap.width, 64);
        assert_eq!(config.bitmap.height, 240);
        assert_eq!(config.shader, ShaderConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::default();
        config.bitmap.clear_color = Rgb::new(1, 2, 3);
        config.render.threads = 4;
        config.shader.flags = ShaderFlags::CENTER_COORDS | ShaderFlags::NORMALIZE_COORDS;
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Config::from_json("{ \"bitmap\": { \"width\": -1 } }").is_err());
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn test_load_missing_file_fails_with_path() {
        let err = Config::load("/nonexistent/pixelflow-raster.json").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/pixelflow-raster.json"));
    }

    #[test]
    fn test_render_options() {
        let render = RenderConfig { threads: 3 };
        assert_eq!(render.options().num_threads, 3);
        assert!(RenderConfig::default().options().num_threads >= 1);
    }
}
