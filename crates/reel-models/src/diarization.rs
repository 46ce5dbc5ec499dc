//! Speaker diarization segments.

use serde::{Deserialize, Serialize};

/// Segments shorter than this are dropped as noise.
pub const MIN_SEGMENT_SECS: f64 = 1.0;

/// One contiguous stretch of speech attributed to a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationSegment {
    /// Zero-based speaker index
    pub speaker: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl DiarizationSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Normalize raw diarization output.
///
/// Speaker labels are swapped so the first segment always belongs to speaker 0
/// (only the 0/1 pair is swapped), and segments under [`MIN_SEGMENT_SECS`] are
/// removed.
pub fn normalize_segments(segments: Vec<DiarizationSegment>) -> Vec<DiarizationSegment> {
    let swap = segments.first().map(|s| s.speaker == 1).unwrap_or(false);

    segments
        .into_iter()
        .map(|mut segment| {
            if swap {
                segment.speaker = match segment.speaker {
                    0 => 1,
                    1 => 0,
                    other => other,
                };
            }
            segment
        })
        .filter(|segment| segment.duration() >= MIN_SEGMENT_SECS)
        .collect()
}
