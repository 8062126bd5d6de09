// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub image: ImageConfig,
    pub compute: ComputeConfig,
    pub debug: DebugConfig,
}

/// Output image settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub output: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 3200,
            height: 2400,
            output: "mandelbrot.png".to_string(),
        }
    }
}

/// Compute dispatch settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Path to the compiled SPIR-V compute shader
    pub shader: String,
    /// Local workgroup edge length; must match local_size_x/y in the shader
    pub workgroup_size: u32,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            shader: "shaders/mandelbrot.comp.spv".to_string(),
            workgroup_size: 32,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_image() {
        let config = Config::default();
        assert_eq!(config.image.width, 3200);
        assert_eq!(config.image.height, 2400);
        assert_eq!(config.compute.workgroup_size, 32);
        assert!(config.debug.validation_layers);
    }

    #[test]
    fn partial_toml_keeps_defaults_elsewhere() {
        let config: Config = toml::from_str(
            r#"
            [image]
            width = 64
            height = 48

            [debug]
            validation_layers = false
            "#,
        )
        .unwrap();

        assert_eq!(config.image.width, 64);
        assert_eq!(config.image.height, 48);
        assert_eq!(config.image.output, "mandelbrot.png");
        assert_eq!(config.compute.shader, "shaders/mandelbrot.comp.spv");
        assert!(!config.debug.validation_layers);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.image.output, "mandelbrot.png");
        assert_eq!(config.compute.workgroup_size, 32);
    }
}
