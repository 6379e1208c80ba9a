use std::path::Path;

use anyhow::Result;

use fluency::assess::{assess_with, AssessmentReport, ErrorClassifier, ReportFormat};
use fluency::FluencyConfig;

use super::{load_matching, resolve_duration};

pub async fn cmd_assess(
    input: &Path,
    duration: Option<&str>,
    audio: Option<&Path>,
    format: ReportFormat,
    output: Option<&Path>,
    behaviors: bool,
    config: &FluencyConfig,
) -> Result<()> {
    eprintln!("📖 Assessing: {}", input.display());

    let result = load_matching(input)?;
    let duration = resolve_duration(duration, audio, &config.encoder.ffprobe_path).await?;

    let classifier = ErrorClassifier::new().with_fluency_behaviors(behaviors);
    let assessment = assess_with(&classifier, &result, duration)?;
    let metrics = &assessment.summary.metrics;

    eprintln!(
        "   Accuracy: {}%  Rate: {} WPM  Prosody: {:.1} ({})",
        metrics.accuracy,
        metrics.words_per_minute,
        metrics.prosody_score,
        metrics.prosody_grade.label()
    );
    if let Some(primary) = &assessment.summary.primary_pattern {
        eprintln!("   Focus: {}", primary.description);
    }

    match output {
        Some(path) => {
            AssessmentReport::save(&assessment, format, path)?;
            eprintln!("💾 Saved report to {}", path.display());
        }
        None => println!("{}", AssessmentReport::generate(&assessment, format)?),
    }

    Ok(())
}
