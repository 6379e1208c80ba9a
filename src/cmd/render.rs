use std::path::Path;

use anyhow::Result;

use fluency::assess::compute_metrics;
use fluency::video::{EncodeOptions, RenderRequest, SessionInfo, VideoPipeline};
use fluency::FluencyConfig;

use super::{load_matching, resolve_duration};

pub async fn cmd_render(
    input: &Path,
    audio: &Path,
    output: &Path,
    duration: Option<&str>,
    name: &str,
    fast: bool,
    config: &FluencyConfig,
) -> Result<()> {
    eprintln!("🎬 Rendering: {}", input.display());
    eprintln!("   Audio: {}", audio.display());
    eprintln!("   Output: {}", output.display());

    let result = load_matching(input)?;
    let duration = resolve_duration(duration, Some(audio), &config.encoder.ffprobe_path).await?;
    let metrics = compute_metrics(&result, duration)?;

    let mut pipeline_config = config.to_pipeline_config();
    if fast {
        pipeline_config.encoder = EncodeOptions {
            ffmpeg_path: pipeline_config.encoder.ffmpeg_path.clone(),
            ffprobe_path: pipeline_config.encoder.ffprobe_path.clone(),
            ..EncodeOptions::fast()
        };
        eprintln!("   Preset: {}", pipeline_config.encoder.preset);
    }

    let pipeline = VideoPipeline::new(pipeline_config)?;
    let rendered = pipeline
        .render(&RenderRequest {
            words: result.words,
            audio: audio.to_path_buf(),
            audio_duration: Some(duration),
            output: output.to_path_buf(),
            session: SessionInfo {
                name: name.to_string(),
                words_per_minute: metrics.words_per_minute,
            },
        })
        .await?;

    eprintln!(
        "\n✅ Render complete in {:.1}s",
        rendered.processing_time_secs
    );
    eprintln!("   Frames: {}", rendered.frame_count);
    eprintln!("   Output: {}", rendered.output_path.display());

    Ok(())
}
