//! ffmpeg concat-demuxer manifest
//!
//! Format:
//! ```text
//! file '/work/frame_00000.png'
//! duration 0.5000
//! file '/work/frame_00001.png'
//! duration 1.2500
//! file '/work/frame_00001.png'
//! ```
//! The concat demuxer ignores the duration of the last entry, so the final
//! image is listed once more without one.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::keyframes::FramePlan;
use crate::error::{FluencyError, Result, VideoStage};

/// A rendered image and how long it is shown
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame {
    pub timestamp: f64,
    pub duration: f64,
    pub image: PathBuf,
}

impl KeyFrame {
    #[must_use]
    pub fn new(plan: FramePlan, image: impl Into<PathBuf>) -> Self {
        Self {
            timestamp: plan.timestamp,
            duration: plan.duration,
            image: image.into(),
        }
    }
}

/// Quote a path for a concat `file` directive
fn quote_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "'\\''"))
}

/// Build the manifest text for `frames`
pub fn build_manifest(frames: &[KeyFrame]) -> Result<String> {
    let Some(last) = frames.last() else {
        return Err(FluencyError::InvalidInput(
            "cannot build a manifest without frames".to_string(),
        ));
    };

    let mut out = String::new();
    for frame in frames {
        if !frame.duration.is_finite() || frame.duration < 0.0 {
            return Err(FluencyError::InvalidInput(format!(
                "frame {} has invalid duration {}",
                frame.image.display(),
                frame.duration
            )));
        }
        writeln!(out, "file {}", quote_path(&frame.image))?;
        writeln!(out, "duration {:.4}", frame.duration)?;
    }
    writeln!(out, "file {}", quote_path(&last.image))?;

    Ok(out)
}

/// Build the manifest and write it to `path`
pub async fn write_manifest(path: &Path, frames: &[KeyFrame]) -> Result<()> {
    let manifest = build_manifest(frames)?;
    tokio::fs::write(path, manifest).await.map_err(|e| {
        FluencyError::storage(
            VideoStage::Manifest,
            format!("cannot write {}: {e}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(image: &str, duration: f64) -> KeyFrame {
        KeyFrame {
            timestamp: 0.0,
            duration,
            image: PathBuf::from(image),
        }
    }

    #[test]
    fn test_manifest_bytes() {
        let manifest =
            build_manifest(&[frame("/w/frame_00000.png", 0.5), frame("/w/frame_00001.png", 1.25)])
                .unwrap();

        assert_eq!(
            manifest,
            "file '/w/frame_00000.png'\n\
             duration 0.5000\n\
             file '/w/frame_00001.png'\n\
             duration 1.2500\n\
             file '/w/frame_00001.png'\n"
        );
    }

    #[test]
    fn test_single_frame_repeated() {
        let manifest = build_manifest(&[frame("a.png", 0.1)]).unwrap();
        assert_eq!(manifest, "file 'a.png'\nduration 0.1000\nfile 'a.png'\n");
    }

    #[test]
    fn test_quotes_escaped() {
        let manifest = build_manifest(&[frame("/tmp/it's.png", 1.0)]).unwrap();
        assert!(manifest.starts_with("file '/tmp/it'\\''s.png'\n"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            build_manifest(&[]),
            Err(FluencyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(matches!(
            build_manifest(&[frame("a.png", -1.0)]),
            Err(FluencyError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.txt");
        write_manifest(&path, &[frame("a.png", 2.0)]).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "file 'a.png'\nduration 2.0000\nfile 'a.png'\n");
    }
}
