//! Video pipeline orchestration with mock encoders.
//!
//! Frames are rasterized without a font and encoding is replaced by an
//! in-process encoder, so these tests need neither ffmpeg nor system fonts.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fluency::alignment::{AlignedWord, WordStatus};
use fluency::video::{
    BlockRasterizer, EncodeJob, EncodeOptions, FixedAdvanceMeasurer, PipelineConfig,
    RenderRequest, SessionInfo, VideoEncoder, VideoPipeline,
};
use fluency::{FluencyError, Result, VideoStage};

/// Records the manifest it was given and writes a fake video
#[derive(Default)]
struct RecordingEncoder {
    manifest: Mutex<Option<String>>,
}

#[async_trait]
impl VideoEncoder for RecordingEncoder {
    async fn submit(&self, job: &EncodeJob, _options: &EncodeOptions) -> Result<()> {
        let manifest = tokio::fs::read_to_string(&job.manifest).await?;

        // every frame must be on disk before encoding starts
        for line in manifest.lines().filter(|l| l.starts_with("file ")) {
            let path = line.trim_start_matches("file '").trim_end_matches('\'');
            assert!(Path::new(path).is_file(), "missing frame {path}");
        }

        *self.manifest.lock().unwrap() = Some(manifest);
        tokio::fs::write(&job.output, b"fake mp4").await?;
        Ok(())
    }
}

/// Resolves entries the way the concat demuxer does: relative to the manifest
struct ConcatResolvingEncoder;

#[async_trait]
impl VideoEncoder for ConcatResolvingEncoder {
    async fn submit(&self, job: &EncodeJob, _options: &EncodeOptions) -> Result<()> {
        let manifest = tokio::fs::read_to_string(&job.manifest).await?;
        let base = job.manifest.parent().unwrap();

        let unresolved: Vec<PathBuf> = manifest
            .lines()
            .filter(|l| l.starts_with("file "))
            .map(|l| base.join(l.trim_start_matches("file '").trim_end_matches('\'')))
            .filter(|p| !p.is_file())
            .collect();
        if !unresolved.is_empty() {
            return Err(FluencyError::encoding(
                VideoStage::Encode,
                format!("unresolvable manifest entries: {unresolved:?}"),
            ));
        }

        tokio::fs::write(&job.output, b"fake mp4").await?;
        Ok(())
    }
}

/// Fails like ffmpeg exiting non-zero
struct FailingEncoder;

#[async_trait]
impl VideoEncoder for FailingEncoder {
    async fn submit(&self, job: &EncodeJob, _options: &EncodeOptions) -> Result<()> {
        // leave a half-written file behind, as a crashed encoder would
        tokio::fs::write(&job.output, b"partial").await?;
        Err(FluencyError::encoding(
            VideoStage::Encode,
            "ffmpeg exited with status: 1",
        ))
    }
}

/// Claims success without producing anything
struct SilentEncoder;

#[async_trait]
impl VideoEncoder for SilentEncoder {
    async fn submit(&self, _job: &EncodeJob, _options: &EncodeOptions) -> Result<()> {
        Ok(())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    work_root: PathBuf,
    out_dir: PathBuf,
    audio: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let work_root = dir.path().join("work");
        let out_dir = dir.path().join("out");
        std::fs::create_dir_all(&work_root).unwrap();
        std::fs::create_dir_all(&out_dir).unwrap();
        let audio = dir.path().join("reading.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        Self {
            _dir: dir,
            work_root,
            out_dir,
            audio,
        }
    }

    fn pipeline(&self, encoder: Arc<dyn VideoEncoder>) -> VideoPipeline {
        let mut config = PipelineConfig::default()
            .with_work_root(&self.work_root)
            .with_concurrency(2);
        config.canvas.width = 320;
        config.canvas.height = 180;
        config.canvas.font_size = 16.0;
        config.canvas.padding = 8.0;
        config.canvas.line_height = 24.0;

        VideoPipeline::with_components(
            config,
            Arc::new(FixedAdvanceMeasurer::default()),
            Arc::new(BlockRasterizer),
            encoder,
        )
    }

    fn request(&self, words: Vec<AlignedWord>) -> RenderRequest {
        RenderRequest {
            words,
            audio: self.audio.clone(),
            audio_duration: Some(2.0),
            output: self.out_dir.join("reading.mp4"),
            session: SessionInfo {
                name: "Ava".to_string(),
                words_per_minute: 90,
            },
        }
    }

    fn work_root_is_empty(&self) -> bool {
        std::fs::read_dir(&self.work_root).unwrap().next().is_none()
    }

    fn out_dir_entries(&self) -> Vec<String> {
        std::fs::read_dir(&self.out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }
}

fn reading() -> Vec<AlignedWord> {
    vec![
        AlignedWord::correct("the").with_timing(0.0, 0.4),
        AlignedWord::read_as("cat", "cot", WordStatus::Misread).with_timing(0.5, 1.0),
        AlignedWord::skipped("sat"),
    ]
}

#[tokio::test]
async fn renders_and_publishes_video() {
    let fixture = Fixture::new();
    let encoder = Arc::new(RecordingEncoder::default());
    let pipeline = fixture.pipeline(encoder.clone());

    let result = pipeline.render(&fixture.request(reading())).await.unwrap();

    // 0, 0.4, 0.401, 0.5, 1.0, 1.001 (2.0 only closes the last hold)
    assert_eq!(result.frame_count, 6);
    assert_eq!(result.output_path, fixture.out_dir.join("reading.mp4"));
    assert_eq!(std::fs::read(&result.output_path).unwrap(), b"fake mp4");
    assert_eq!(fixture.out_dir_entries(), vec!["reading.mp4".to_string()]);
    assert!(fixture.work_root_is_empty());

    let manifest = encoder.manifest.lock().unwrap().clone().unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[1], "duration 0.4000");
    assert_eq!(lines[3], "duration 0.0010");
    assert_eq!(lines[11], "duration 0.9990");
    assert!(lines[0].ends_with("frame_00000.png'"));
    assert!(lines[10].ends_with("frame_00005.png'"));
    assert_eq!(lines[12], lines[10]);
}

#[tokio::test]
async fn encoder_failure_cleans_up() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(Arc::new(FailingEncoder));

    let err = pipeline.render(&fixture.request(reading())).await.unwrap_err();

    assert_eq!(err.stage(), Some(VideoStage::Encode));
    assert!(fixture.work_root_is_empty());
    assert!(fixture.out_dir_entries().is_empty());
}

#[tokio::test]
async fn missing_encoder_output_is_encoding_failure() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(Arc::new(SilentEncoder));

    let err = pipeline.render(&fixture.request(reading())).await.unwrap_err();

    assert!(matches!(err, FluencyError::EncodingFailure { .. }));
    assert!(fixture.work_root_is_empty());
    assert!(fixture.out_dir_entries().is_empty());
}

#[tokio::test]
async fn empty_word_list_is_invalid_input() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(Arc::new(RecordingEncoder::default()));

    let err = pipeline.render(&fixture.request(Vec::new())).await.unwrap_err();

    assert!(matches!(err, FluencyError::InvalidInput(_)));
    assert!(fixture.work_root_is_empty());
}

#[tokio::test]
async fn negative_duration_is_invalid_input() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(Arc::new(RecordingEncoder::default()));
    let mut request = fixture.request(reading());
    request.audio_duration = Some(-1.0);

    let err = pipeline.render(&request).await.unwrap_err();
    assert!(matches!(err, FluencyError::InvalidInput(_)));
}

#[tokio::test]
async fn missing_audio_is_invalid_input() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(Arc::new(RecordingEncoder::default()));
    let mut request = fixture.request(reading());
    request.audio = fixture.out_dir.join("missing.wav");

    let err = pipeline.render(&request).await.unwrap_err();
    assert!(matches!(err, FluencyError::InvalidInput(_)));
}

#[tokio::test]
async fn unusable_work_root_is_storage_failure() {
    let fixture = Fixture::new();
    let blocker = fixture.out_dir.join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();

    let mut config = fixture.pipeline(Arc::new(SilentEncoder)).config().clone();
    config.work_root = blocker;
    let pipeline = VideoPipeline::with_components(
        config,
        Arc::new(FixedAdvanceMeasurer::default()),
        Arc::new(BlockRasterizer),
        Arc::new(RecordingEncoder::default()),
    );

    let err = pipeline.render(&fixture.request(reading())).await.unwrap_err();
    assert_eq!(err.stage(), Some(VideoStage::Prepare));
    assert!(matches!(err, FluencyError::StorageFailure { .. }));
}

#[tokio::test]
async fn relative_work_root_resolves_frames() {
    let fixture = Fixture::new();
    let scratch = tempfile::Builder::new()
        .prefix(".fluency-pipeline-")
        .tempdir_in(".")
        .unwrap();
    let relative_root = PathBuf::from(scratch.path().file_name().unwrap());

    let mut config = fixture.pipeline(Arc::new(SilentEncoder)).config().clone();
    config.work_root = relative_root;
    let pipeline = VideoPipeline::with_components(
        config,
        Arc::new(FixedAdvanceMeasurer::default()),
        Arc::new(BlockRasterizer),
        Arc::new(ConcatResolvingEncoder),
    );

    let result = pipeline.render(&fixture.request(reading())).await.unwrap();

    assert_eq!(std::fs::read(&result.output_path).unwrap(), b"fake mp4");
    assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
}
