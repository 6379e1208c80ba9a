use std::path::Path;

use anyhow::Result;

use fluency::alignment::parse_duration;
use fluency::video::{plan_frames, transition_times};

use super::load_matching;

pub fn cmd_keyframes(input: &Path, duration: &str, holds: bool) -> Result<()> {
    let result = load_matching(input)?;
    let duration = parse_duration(duration)?;

    let times = transition_times(
        result.words.iter().map(|w| (w.start_time, w.end_time)),
        duration,
    );
    eprintln!(
        "🎞️  {} keyframes for {} words over {duration:.3}s",
        times.len(),
        result.words.len()
    );

    if holds {
        for plan in plan_frames(&times) {
            println!("{:.3}\t{:.4}", plan.timestamp, plan.duration);
        }
    } else {
        for time in times {
            println!("{time:.3}");
        }
    }

    Ok(())
}
