//! Configuration loaded from `~/.config/fluency/config.toml`.
//!
//! Every section is optional; missing keys fall back to defaults.
//!
//! ```toml
//! [canvas]
//! width = 1920
//! height = 1080
//! font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//!
//! [encoder]
//! preset = "veryfast"
//! crf = 20
//!
//! [render]
//! concurrency = 8
//! work_dir = "/var/tmp"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::video::{CanvasConfig, EncodeOptions, PipelineConfig};

/// Frame rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Frames rendered in parallel (defaults to the CPU count).
    pub concurrency: Option<usize>,
    /// Parent directory for per-run work directories (defaults to the system temp dir).
    pub work_dir: Option<PathBuf>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluencyConfig {
    pub canvas: CanvasConfig,
    pub encoder: EncodeOptions,
    pub render: RenderSettings,
}

impl FluencyConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields defaults; an explicitly named file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Pipeline configuration with these settings applied.
    #[must_use]
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig {
            canvas: self.canvas.clone(),
            encoder: self.encoder.clone(),
            ..PipelineConfig::default()
        };
        if let Some(concurrency) = self.render.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(dir) = &self.render.work_dir {
            config = config.with_work_root(dir);
        }
        config
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fluency")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = FluencyConfig::parse("").unwrap();
        assert_eq!(config.canvas, CanvasConfig::default());
        assert_eq!(config.encoder.crf, 23);
        assert!(config.render.concurrency.is_none());
    }

    #[test]
    fn parse_partial_sections() {
        let toml_str = r#"
[canvas]
width = 1920
height = 1080

[encoder]
preset = "medium"
crf = 20

[render]
concurrency = 3
work_dir = "/var/tmp/fluency"
"#;
        let config = FluencyConfig::parse(toml_str).unwrap();
        assert_eq!(config.canvas.width, 1920);
        assert_eq!(config.canvas.padding, CanvasConfig::default().padding);
        assert_eq!(config.encoder.preset, "medium");
        assert_eq!(config.encoder.audio_codec, "aac");

        let pipeline = config.to_pipeline_config();
        assert_eq!(pipeline.concurrency, 3);
        assert_eq!(pipeline.work_root, PathBuf::from("/var/tmp/fluency"));
        assert_eq!(pipeline.canvas.height, 1080);
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(FluencyConfig::parse("[canvas\nwidth = ").is_err());
        assert!(FluencyConfig::parse("[canvas]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn load_explicit_missing_file_fails() {
        let err = FluencyConfig::load(Some(Path::new("/nonexistent/fluency.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[canvas]\nfont_size = 48.0\n").unwrap();

        let config = FluencyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.canvas.font_size, 48.0);
    }
}
