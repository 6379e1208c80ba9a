//! ffmpeg encoder driving the concat demuxer
//!
//! Encoding runs as one external process per video. Options favour:
//! - fast x264 presets with constant-quality rate control
//! - AAC audio at a standard bitrate
//! - variable frame rate, following the sparse keyframe cadence
//! - `+faststart` so the file streams before it is fully downloaded

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::alignment::parse_duration;
use crate::error::{FluencyError, Result, VideoStage};

/// Stderr lines kept for the error message of a failed encode
const STDERR_TAIL_LINES: usize = 12;

fn locate(tool: &str) -> String {
    which::which(tool).map_or_else(|_| tool.to_string(), |p| p.to_string_lossy().to_string())
}

/// Encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    pub video_codec: String,
    /// x264 speed preset
    pub preset: String,
    /// Constant rate factor (lower is better quality)
    pub crf: u8,
    pub pixel_format: String,
    pub audio_codec: String,
    /// Audio bitrate (e.g., "128k")
    pub audio_bitrate: String,
    /// Additional ffmpeg output arguments
    pub extra_args: Vec<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ffmpeg_path: locate("ffmpeg"),
            ffprobe_path: locate("ffprobe"),
            video_codec: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 23,
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl EncodeOptions {
    /// Fastest encode, for previews
    #[must_use]
    pub fn fast() -> Self {
        Self {
            preset: "ultrafast".to_string(),
            crf: 28,
            extra_args: vec!["-tune".to_string(), "stillimage".to_string()],
            ..Default::default()
        }
    }

    /// Slower encode with better quality, for archived videos
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            preset: "slow".to_string(),
            crf: 18,
            audio_bitrate: "192k".to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    #[must_use]
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }
}

/// Inputs and destination of one encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    /// Concat manifest listing frames and hold times
    pub manifest: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

/// Encoding backend
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Encode `job`, returning once the output file is complete
    async fn submit(&self, job: &EncodeJob, options: &EncodeOptions) -> Result<()>;
}

/// Encoder backed by the ffmpeg binary
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build ffmpeg arguments
    #[must_use]
    pub fn build_args(job: &EncodeJob, options: &EncodeOptions) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "warning", "-y"]
            .iter()
            .map(std::string::ToString::to_string)
            .collect();

        // Frames with per-image durations
        args.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
        args.push(job.manifest.to_string_lossy().to_string());

        args.push("-i".to_string());
        args.push(job.audio.to_string_lossy().to_string());

        args.extend(["-map", "0:v:0", "-map", "1:a:0"].map(String::from));

        // x264 needs even dimensions
        args.push("-vf".to_string());
        args.push("scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string());

        args.push("-c:v".to_string());
        args.push(options.video_codec.clone());
        args.push("-preset".to_string());
        args.push(options.preset.clone());
        args.push("-crf".to_string());
        args.push(options.crf.to_string());
        args.push("-pix_fmt".to_string());
        args.push(options.pixel_format.clone());

        args.push("-c:a".to_string());
        args.push(options.audio_codec.clone());
        args.push("-b:a".to_string());
        args.push(options.audio_bitrate.clone());

        args.extend(["-fps_mode", "vfr", "-movflags", "+faststart"].map(String::from));
        args.extend(options.extra_args.iter().cloned());

        args.push(job.output.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn submit(&self, job: &EncodeJob, options: &EncodeOptions) -> Result<()> {
        let args = Self::build_args(job, options);
        debug!("ffmpeg args: {:?}", args);

        let mut child = Command::new(&options.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FluencyError::encoding(
                    VideoStage::Encode,
                    format!("cannot launch {}: {e}", options.ffmpeg_path),
                )
            })?;

        // Forward stderr to tracing, keeping the tail for error reports
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if line.contains("Error") || line.contains("Warning") {
                        warn!("ffmpeg: {}", line);
                    } else {
                        debug!("ffmpeg: {}", line);
                    }
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                tail
            })
        });

        let status = child.wait().await.map_err(|e| {
            FluencyError::encoding(VideoStage::Encode, format!("ffmpeg did not finish: {e}"))
        })?;

        let tail = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => VecDeque::new(),
        };

        if !status.success() {
            let detail = Vec::from(tail).join("\n");
            return Err(FluencyError::encoding(
                VideoStage::Encode,
                if detail.is_empty() {
                    format!("ffmpeg exited with status: {status}")
                } else {
                    format!("ffmpeg exited with status: {status}\n{detail}")
                },
            ));
        }

        info!("Encoded video to {:?}", job.output);
        Ok(())
    }
}

/// Check if a tool answers `-version`
pub async fn check_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Availability of the external tools the pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub ffmpeg: bool,
    pub ffprobe: bool,
}

impl ToolStatus {
    #[must_use]
    pub fn all_available(&self) -> bool {
        self.ffmpeg && self.ffprobe
    }
}

/// Check ffmpeg and ffprobe from `options`
pub async fn check_tools(options: &EncodeOptions) -> ToolStatus {
    let (ffmpeg, ffprobe) = tokio::join!(
        check_available(&options.ffmpeg_path),
        check_available(&options.ffprobe_path)
    );
    ToolStatus { ffmpeg, ffprobe }
}

/// `FFprobe` JSON output structure
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: String,
}

fn parse_probe_output(stdout: &[u8]) -> Result<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;
    if probe.format.duration.is_empty() {
        return Err(FluencyError::InvalidInput(
            "ffprobe reported no duration".to_string(),
        ));
    }
    parse_duration(&probe.format.duration)
}

/// Duration of an audio file in seconds, read with ffprobe
pub async fn probe_duration(ffprobe: &str, audio: &Path) -> Result<f64> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(audio)
        .output()
        .await
        .map_err(|e| {
            FluencyError::encoding(VideoStage::Prepare, format!("cannot launch {ffprobe}: {e}"))
        })?;

    if !output.status.success() {
        return Err(FluencyError::encoding(
            VideoStage::Prepare,
            format!("ffprobe failed on {}", audio.display()),
        ));
    }

    let duration = parse_probe_output(&output.stdout)?;
    debug!("Probed {} : {:.3}s", audio.display(), duration);
    Ok(duration)
}
