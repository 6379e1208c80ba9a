pub mod assess;
pub mod check;
pub mod keyframes;
pub mod render;

use std::path::Path;

use anyhow::{bail, Context, Result};

use fluency::alignment::{parse_duration, MatchingResult};
use fluency::video::probe_duration;

/// Read and validate a matching result file
pub fn load_matching(input: &Path) -> Result<MatchingResult> {
    MatchingResult::load(input).with_context(|| format!("failed to load {}", input.display()))
}

/// Duration from `--duration`, falling back to probing `audio`
pub async fn resolve_duration(
    duration: Option<&str>,
    audio: Option<&Path>,
    ffprobe: &str,
) -> Result<f64> {
    match (duration, audio) {
        (Some(raw), _) => Ok(parse_duration(raw)?),
        (None, Some(audio)) => {
            let seconds = probe_duration(ffprobe, audio)
                .await
                .with_context(|| format!("failed to probe {}", audio.display()))?;
            eprintln!("⏱️  Audio duration: {seconds:.2}s");
            Ok(seconds)
        }
        (None, None) => bail!("either --duration or --audio is required"),
    }
}
