//! Time-synchronized highlight video
//!
//! Pipeline stages:
//! - [`layout`]: greedy word wrapping with a pluggable text measurer
//! - [`keyframes`]: transition-time sampling instead of a fixed frame rate
//! - [`render`]: pure per-timestamp frame composition as draw commands
//! - [`raster`]: draw commands to RGBA images
//! - [`manifest`] + [`encoder`]: ffmpeg concat manifest and encode
//! - [`pipeline`]: orchestration inside a scoped work directory
//!
//! # Example
//!
//! ```rust,ignore
//! use fluency::video::{PipelineConfig, RenderRequest, SessionInfo, VideoPipeline};
//!
//! let pipeline = VideoPipeline::new(PipelineConfig::default())?;
//! let result = pipeline.render(&RenderRequest {
//!     words,
//!     audio: "reading.wav".into(),
//!     audio_duration: None,
//!     output: "reading.mp4".into(),
//!     session: SessionInfo { name: "Ava".into(), words_per_minute: 92 },
//! }).await?;
//! ```

pub mod encoder;
pub mod font;
pub mod keyframes;
pub mod layout;
pub mod manifest;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod workdir;

pub use encoder::{
    check_available, check_tools, probe_duration, EncodeJob, EncodeOptions, FfmpegEncoder,
    ToolStatus, VideoEncoder,
};
pub use font::GlyphFont;
pub use keyframes::{keyframe_times, plan_frames, transition_times, FramePlan};
pub use layout::{layout_words, FixedAdvanceMeasurer, FontSpec, LayoutParams, TextMeasurer, WordLayout};
pub use manifest::{build_manifest, write_manifest, KeyFrame};
pub use pipeline::{PipelineConfig, RenderRequest, RenderResult, VideoPipeline};
pub use raster::{BlockRasterizer, FrameRasterizer, GlyphRasterizer};
pub use render::{
    resolve_word_style, CanvasConfig, Color, DrawCommand, Frame, FrameRenderer, Palette,
    SessionInfo, WordState, WordStyle,
};
pub use workdir::ScopedWorkDir;
