//! Full video pipeline: layout -> keyframes -> frames -> manifest -> encode
//!
//! Orchestrates one highlight video from aligned words and an audio track.
//! All intermediates live in a [`ScopedWorkDir`]; the finished file only
//! appears at the caller's path once encoding has succeeded.

use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::encoder::{
    check_tools, probe_duration, EncodeJob, EncodeOptions, FfmpegEncoder, ToolStatus, VideoEncoder,
};
use super::font::GlyphFont;
use super::keyframes::{keyframe_times, plan_frames, FramePlan};
use super::layout::{layout_words, TextMeasurer, WordLayout};
use super::manifest::{write_manifest, KeyFrame};
use super::raster::{FrameRasterizer, GlyphRasterizer};
use super::render::{CanvasConfig, FrameRenderer, Palette, SessionInfo};
use super::workdir::ScopedWorkDir;
use crate::alignment::{check_duration, AlignedWord};
use crate::error::{FluencyError, Result, VideoStage};

const MANIFEST_NAME: &str = "frames.txt";

fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

/// Configuration for the video pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub canvas: CanvasConfig,
    pub encoder: EncodeOptions,
    pub palette: Palette,
    /// Frames rendered in parallel
    pub concurrency: usize,
    /// Parent of the per-run work directories
    pub work_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            encoder: EncodeOptions::default(),
            palette: Palette::default(),
            concurrency: default_concurrency(),
            work_root: std::env::temp_dir(),
        }
    }
}

impl PipelineConfig {
    /// Create config for quick previews
    #[must_use]
    pub fn fast() -> Self {
        Self {
            encoder: EncodeOptions::fast(),
            ..Default::default()
        }
    }

    /// Create config for high-quality file output
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            encoder: EncodeOptions::high_quality(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = root.into();
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// What to render and where to put it
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub words: Vec<AlignedWord>,
    pub audio: PathBuf,
    /// Audio length in seconds; probed with ffprobe when absent
    pub audio_duration: Option<f64>,
    pub output: PathBuf,
    pub session: SessionInfo,
}

/// Outcome of a successful render
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub output_path: PathBuf,
    pub frame_count: usize,
    pub audio_duration: f64,
    pub processing_time_secs: f64,
}

/// Highlight video pipeline
pub struct VideoPipeline {
    config: PipelineConfig,
    measurer: Arc<dyn TextMeasurer>,
    rasterizer: Arc<dyn FrameRasterizer>,
    encoder: Arc<dyn VideoEncoder>,
}

impl VideoPipeline {
    /// Create a pipeline using a system or configured font and ffmpeg
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let font = GlyphFont::discover(config.canvas.font_path.as_deref())?;
        debug!("Loaded font {}", font.source().display());

        Ok(Self::with_components(
            config,
            Arc::new(font.clone()),
            Arc::new(GlyphRasterizer::new(font)),
            Arc::new(FfmpegEncoder::new()),
        ))
    }

    /// Create a pipeline with explicit measurement, raster and encode backends
    #[must_use]
    pub fn with_components(
        config: PipelineConfig,
        measurer: Arc<dyn TextMeasurer>,
        rasterizer: Arc<dyn FrameRasterizer>,
        encoder: Arc<dyn VideoEncoder>,
    ) -> Self {
        Self {
            config,
            measurer,
            rasterizer,
            encoder,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Check that ffmpeg and ffprobe can be launched
    pub async fn check_dependencies(&self) -> ToolStatus {
        check_tools(&self.config.encoder).await
    }

    /// Lay out words on this pipeline's canvas
    pub fn layout(&self, words: &[AlignedWord]) -> Result<Vec<WordLayout>> {
        layout_words(words, &self.config.canvas.layout_params(), self.measurer.as_ref())
    }

    /// Render `request` to a video file
    ///
    /// On failure the work directory is removed and nothing is left at the
    /// output path.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderResult> {
        let start_time = Instant::now();
        info!("Starting video render for {:?}", request.output);

        validate_request(request)?;
        let audio_duration = match request.audio_duration {
            Some(seconds) => check_duration(seconds)?,
            None => probe_duration(&self.config.encoder.ffprobe_path, &request.audio).await?,
        };

        let layout = self.layout(&request.words)?;
        let plans = plan_frames(&keyframe_times(&layout, audio_duration));
        info!(
            "Planned {} keyframes for {} words over {:.2}s",
            plans.len(),
            layout.len(),
            audio_duration
        );

        let workdir = ScopedWorkDir::create(&self.config.work_root)?;

        let encoded = match self.produce(&workdir, request, layout, &plans).await {
            Ok(path) => path,
            Err(e) => {
                if let Err(cleanup) = workdir.close().await {
                    warn!("{}", cleanup);
                }
                return Err(e);
            }
        };

        let staged = match stage_output(&encoded, &request.output).await {
            Ok(path) => path,
            Err(e) => {
                if let Err(cleanup) = workdir.close().await {
                    warn!("{}", cleanup);
                }
                return Err(e);
            }
        };

        if let Err(e) = workdir.close().await {
            discard(&staged).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&staged, &request.output).await {
            discard(&staged).await;
            return Err(FluencyError::storage(
                VideoStage::Finalize,
                format!("cannot move video to {}: {e}", request.output.display()),
            ));
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        info!("Pipeline completed in {:.2}s", elapsed);

        Ok(RenderResult {
            output_path: request.output.clone(),
            frame_count: plans.len(),
            audio_duration,
            processing_time_secs: elapsed,
        })
    }

    /// Render frames, write the manifest and encode inside `workdir`
    async fn produce(
        &self,
        workdir: &ScopedWorkDir,
        request: &RenderRequest,
        layout: Vec<WordLayout>,
        plans: &[FramePlan],
    ) -> Result<PathBuf> {
        info!("Rendering {} frames...", plans.len());
        let frames = self
            .render_frames(workdir, layout, &request.session, plans)
            .await?;

        let manifest = workdir.join(MANIFEST_NAME);
        write_manifest(&manifest, &frames).await?;

        let extension = request
            .output
            .extension()
            .map_or_else(|| "mp4".to_string(), |e| e.to_string_lossy().to_string());
        let job = EncodeJob {
            manifest,
            audio: request.audio.clone(),
            output: workdir.join(format!("output.{extension}")),
        };

        info!("Encoding video...");
        self.encoder.submit(&job, &self.config.encoder).await?;

        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(FluencyError::encoding(
                VideoStage::Encode,
                "encoder reported success but produced no file",
            ));
        }
        Ok(job.output)
    }

    /// Render every planned frame to a PNG, in plan order
    async fn render_frames(
        &self,
        workdir: &ScopedWorkDir,
        layout: Vec<WordLayout>,
        session: &SessionInfo,
        plans: &[FramePlan],
    ) -> Result<Vec<KeyFrame>> {
        let renderer = Arc::new(FrameRenderer::new(
            self.config.canvas.clone(),
            self.config.palette.clone(),
        ));
        let layout = Arc::new(layout);
        let session = Arc::new(session.clone());

        futures::stream::iter(plans.iter().copied().enumerate())
            .map(|(index, plan)| {
                let renderer = Arc::clone(&renderer);
                let rasterizer = Arc::clone(&self.rasterizer);
                let layout = Arc::clone(&layout);
                let session = Arc::clone(&session);
                let path = workdir.join(format!("frame_{index:05}.png"));

                async move {
                    tokio::task::spawn_blocking(move || -> Result<KeyFrame> {
                        let frame = renderer.render(plan.timestamp, &layout, &session);
                        let image = rasterizer.rasterize(&frame)?;
                        write_png(&path, &image)?;
                        Ok(KeyFrame::new(plan, path))
                    })
                    .await
                    .map_err(|e| {
                        FluencyError::storage(VideoStage::Render, format!("frame task failed: {e}"))
                    })?
                }
            })
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await
    }
}

fn validate_request(request: &RenderRequest) -> Result<()> {
    if request.words.is_empty() {
        return Err(FluencyError::InvalidInput(
            "cannot render a video without words".to_string(),
        ));
    }
    if !request.audio.is_file() {
        return Err(FluencyError::InvalidInput(format!(
            "audio file not found: {}",
            request.audio.display()
        )));
    }
    if request.output.file_name().is_none() {
        return Err(FluencyError::InvalidInput(format!(
            "output path has no file name: {}",
            request.output.display()
        )));
    }
    Ok(())
}

/// Write a PNG and flush it to disk
fn write_png(path: &Path, image: &image::RgbaImage) -> Result<()> {
    let storage = |e: &dyn std::fmt::Display| {
        FluencyError::storage(VideoStage::Render, format!("{}: {e}", path.display()))
    };

    let file = std::fs::File::create(path).map_err(|e| storage(&e))?;
    let mut writer = BufWriter::new(file);
    image
        .write_to(&mut writer, image::ImageFormat::Png)
        .map_err(|e| storage(&e))?;
    writer.flush().map_err(|e| storage(&e))?;
    let file = writer.into_inner().map_err(|e| storage(&e))?;
    file.sync_all().map_err(|e| storage(&e))?;
    Ok(())
}

/// Hidden sibling of `output` the finished video is staged under
fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map_or_else(|| "video".to_string(), |n| n.to_string_lossy().to_string());
    output.with_file_name(format!(".{name}.{}.partial", uuid::Uuid::new_v4().simple()))
}

/// Move the encoded file next to `output`, copying across filesystems
async fn stage_output(encoded: &Path, output: &Path) -> Result<PathBuf> {
    let staged = staging_path(output);

    if tokio::fs::rename(encoded, &staged).await.is_ok() {
        return Ok(staged);
    }

    debug!("Rename failed, copying {:?} to {:?}", encoded, staged);
    if let Err(e) = tokio::fs::copy(encoded, &staged).await {
        discard(&staged).await;
        return Err(FluencyError::storage(
            VideoStage::Finalize,
            format!("cannot stage video next to {}: {e}", output.display()),
        ));
    }
    Ok(staged)
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
