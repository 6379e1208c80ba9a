//! `fluency` - Oral reading fluency scoring and highlight video rendering
//!
//! # Features
//!
//! - **Metrics**: accuracy, words per minute and a blended prosody grade
//! - **Error patterns**: phonetic, visual-confusion and substitution buckets
//! - **Summaries**: primary focus pattern, strengths and struggles, JSON/Markdown reports
//! - **Video**: time-synchronized word highlighting encoded with ffmpeg
//!
//! # Example
//!
//! ```rust
//! use fluency::alignment::{AlignedWord, MatchingResult};
//! use fluency::assess::{assess, ProsodyGrade};
//!
//! let result = MatchingResult::from_words(vec![AlignedWord::correct("cat").with_timing(0.0, 1.0)]);
//! let assessment = assess(&result, 10.0)?;
//!
//! assert_eq!(assessment.summary.metrics.words_per_minute, 6);
//! assert_eq!(assessment.summary.metrics.prosody_grade, ProsodyGrade::Proficient);
//! # Ok::<(), fluency::FluencyError>(())
//! ```

pub mod alignment;
pub mod assess;
pub mod config;
pub mod error;
pub mod video;

pub use alignment::{AlignedWord, MatchingResult, WordStatus};
pub use assess::{assess, Assessment, AssessmentReport, ErrorPattern, Metrics, PatternType, PrimaryPattern};
pub use config::FluencyConfig;
pub use error::{FluencyError, Result, VideoStage};
pub use video::{PipelineConfig, RenderRequest, RenderResult, VideoPipeline};

/// Version of fluency
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
