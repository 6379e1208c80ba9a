//! Assessment report generation
//!
//! Renders an [`Assessment`] as JSON for machines or Markdown for people.

use std::fmt::Write as FmtWrite;
use std::path::Path;

use super::Assessment;
use crate::error::Result;

/// Examples listed per pattern in reports
const REPORT_EXAMPLE_LIMIT: usize = 3;

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON (default, machine-readable)
    #[default]
    Json,
    /// Markdown (human-readable)
    Markdown,
}

/// Assessment report generator
pub struct AssessmentReport;

impl AssessmentReport {
    /// Generate report in specified format
    pub fn generate(assessment: &Assessment, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Self::to_json(assessment),
            ReportFormat::Markdown => Self::to_markdown(assessment),
        }
    }

    /// Save report to file
    pub fn save(assessment: &Assessment, format: ReportFormat, path: &Path) -> Result<()> {
        let content = Self::generate(assessment, format)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn to_json(assessment: &Assessment) -> Result<String> {
        let shown = Assessment {
            patterns: assessment
                .patterns
                .iter()
                .map(|p| p.truncated(REPORT_EXAMPLE_LIMIT))
                .collect(),
            ..assessment.clone()
        };
        Ok(serde_json::to_string_pretty(&shown)?)
    }

    fn to_markdown(assessment: &Assessment) -> Result<String> {
        let mut md = String::new();
        let metrics = &assessment.summary.metrics;

        writeln!(md, "# Reading Fluency Report\n")?;

        writeln!(md, "## Metrics\n")?;
        writeln!(md, "- **Accuracy**: {}%", metrics.accuracy)?;
        writeln!(md, "- **Words per minute**: {}", metrics.words_per_minute)?;
        writeln!(
            md,
            "- **Prosody**: {:.1} ({})",
            metrics.prosody_score,
            metrics.prosody_grade.label()
        )?;
        writeln!(
            md,
            "- **Words**: {} total, {} correct, {} errors, {} skipped",
            metrics.total_words, metrics.correct_count, metrics.error_count, metrics.skip_count
        )?;
        writeln!(md)?;

        if let Some(ref primary) = assessment.summary.primary_pattern {
            writeln!(md, "## Focus Area\n")?;
            writeln!(md, "**{}** ({})", primary.description, primary.pattern_type)?;
            if !primary.examples.is_empty() {
                writeln!(md, "\nExamples: {}", primary.examples.join(", "))?;
            }
            writeln!(md)?;
        }

        if !assessment.summary.strengths.is_empty() {
            writeln!(md, "## Strengths\n")?;
            for word in &assessment.summary.strengths {
                writeln!(md, "- {word}")?;
            }
            writeln!(md)?;
        }

        if !assessment.summary.struggles.is_empty() {
            writeln!(md, "## Struggles\n")?;
            for struggle in &assessment.summary.struggles {
                writeln!(md, "- {} → {}", struggle.expected, struggle.spoken)?;
            }
            writeln!(md)?;
        }

        if !assessment.patterns.is_empty() {
            writeln!(md, "## Error Patterns\n")?;
            writeln!(md, "| Pattern | Count | Examples |")?;
            writeln!(md, "|---------|-------|----------|")?;
            for pattern in &assessment.patterns {
                let examples: Vec<String> = pattern
                    .examples
                    .iter()
                    .take(REPORT_EXAMPLE_LIMIT)
                    .map(ToString::to_string)
                    .collect();
                writeln!(
                    md,
                    "| {} | {} | {} |",
                    pattern.description,
                    pattern.count,
                    examples.join(", ")
                )?;
            }
        }

        Ok(md)
    }
}
