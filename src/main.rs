//! `fluency` CLI - score oral reading and render highlight videos

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fluency::assess::ReportFormat;

#[derive(Parser)]
#[command(name = "fluency")]
#[command(about = "Reading fluency scoring and highlight video rendering")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/fluency/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormatArg {
    Json,
    Markdown,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => Self::Json,
            ReportFormatArg::Markdown => Self::Markdown,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score a reading and print the assessment report
    Assess {
        /// Matching result JSON from the alignment step
        input: PathBuf,

        /// Audio duration in seconds
        #[arg(short, long, allow_hyphen_values = true)]
        duration: Option<String>,

        /// Audio file to probe for the duration
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportFormatArg,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also report hesitation and repetition patterns
        #[arg(long)]
        behaviors: bool,
    },

    /// Render a time-synchronized highlight video
    Render {
        /// Matching result JSON from the alignment step
        input: PathBuf,

        /// Audio track of the reading
        #[arg(short, long)]
        audio: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,

        /// Audio duration in seconds (probed when omitted)
        #[arg(short, long, allow_hyphen_values = true)]
        duration: Option<String>,

        /// Reader name shown in the header
        #[arg(short, long, default_value = "Reader")]
        name: String,

        /// Faster, lower-quality encode
        #[arg(long)]
        fast: bool,
    },

    /// Print the keyframe timestamps a render would use
    Keyframes {
        /// Matching result JSON from the alignment step
        input: PathBuf,

        /// Audio duration in seconds
        #[arg(short, long, allow_hyphen_values = true)]
        duration: String,

        /// Also print each frame's hold duration
        #[arg(long)]
        holds: bool,
    },

    /// Check that ffmpeg, ffprobe and a font are available
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr keeps stdout clean for reports)
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = fluency::FluencyConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Assess {
            input,
            duration,
            audio,
            format,
            output,
            behaviors,
        } => {
            cmd::assess::cmd_assess(
                &input,
                duration.as_deref(),
                audio.as_deref(),
                format.into(),
                output.as_deref(),
                behaviors,
                &config,
            )
            .await?;
        }
        Commands::Render {
            input,
            audio,
            output,
            duration,
            name,
            fast,
        } => {
            cmd::render::cmd_render(&input, &audio, &output, duration.as_deref(), &name, fast, &config)
                .await?;
        }
        Commands::Keyframes {
            input,
            duration,
            holds,
        } => {
            cmd::keyframes::cmd_keyframes(&input, &duration, holds)?;
        }
        Commands::Check => {
            cmd::check::cmd_check(&config).await?;
        }
    }

    Ok(())
}
