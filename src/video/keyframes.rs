//! Transition-time sampling
//!
//! Word highlight state only changes when a word starts, while it is being
//! spoken, and just after it ends. Rendering one frame per transition and
//! holding it until the next replaces fixed-rate sampling, so render cost
//! follows word count rather than audio length.

use std::collections::BTreeSet;

use super::layout::WordLayout;

/// Offset after a word's end at which it switches to the spoken state
pub const END_OFFSET_SECS: f64 = 0.001;

/// Hold time for the single frame of a zero-length reading
pub const MIN_HOLD_SECS: f64 = 0.1;

/// Timestamps are collapsed at microsecond resolution
const TICKS_PER_SEC: f64 = 1_000_000.0;

/// A frame to render and how long it stays on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub timestamp: f64,
    pub duration: f64,
}

fn to_ticks(seconds: f64) -> i64 {
    (seconds * TICKS_PER_SEC).round() as i64
}

fn from_ticks(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_SEC
}

/// Sorted, de-duplicated transition times for a set of (start, end) spans
///
/// Always contains 0 and `audio_duration`; times outside that range are
/// dropped.
pub fn transition_times<I>(spans: I, audio_duration: f64) -> Vec<f64>
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let limit = to_ticks(audio_duration.max(0.0));
    let mut ticks = BTreeSet::from([0, limit]);

    for (start, end) in spans {
        // a single edge is an instantaneous word that turns spoken just after it
        let settled = end.or(start).map(|e| e + END_OFFSET_SECS);
        let candidates = [start, end, settled];
        for time in candidates.into_iter().flatten() {
            if !time.is_finite() {
                continue;
            }
            let t = to_ticks(time);
            if (0..=limit).contains(&t) {
                ticks.insert(t);
            }
        }
    }

    ticks.into_iter().map(from_ticks).collect()
}

/// Transition times for laid-out words
#[must_use]
pub fn keyframe_times(words: &[WordLayout], audio_duration: f64) -> Vec<f64> {
    transition_times(
        words.iter().map(|w| (w.start_time, w.end_time)),
        audio_duration,
    )
}

/// Pair each transition with its hold time up to the next one
///
/// The final timestamp (the end of the audio) only closes the last hold;
/// it gets no frame of its own.
#[must_use]
pub fn plan_frames(times: &[f64]) -> Vec<FramePlan> {
    match times {
        [] => Vec::new(),
        [only] => vec![FramePlan {
            timestamp: *only,
            duration: MIN_HOLD_SECS,
        }],
        _ => times
            .windows(2)
            .map(|pair| FramePlan {
                timestamp: pair[0],
                duration: pair[1] - pair[0],
            })
            .collect(),
    }
}
