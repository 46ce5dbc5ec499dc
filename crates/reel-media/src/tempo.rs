//! Tempo-chain decomposition for FFmpeg's `atempo` filter.
//!
//! One `atempo` stage only accepts factors in `[ATEMPO_MIN, ATEMPO_MAX]`.
//! Larger or smaller factors are split into several in-range stages whose
//! product is the requested factor.

use reel_models::encoding::{ATEMPO_MAX, ATEMPO_MIN};

use crate::error::{MediaError, MediaResult};

/// Split `multiplier` into in-range `atempo` stages.
///
/// Full `ATEMPO_MAX` stages are peeled off while the remainder is above the
/// range, full `ATEMPO_MIN` stages while it is below, and the in-range
/// remainder is always the last stage.
pub fn build_chain(multiplier: f64) -> MediaResult<Vec<f64>> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(MediaError::configuration(format!(
            "tempo multiplier must be a positive finite number, got {}",
            multiplier
        )));
    }

    let mut stages = Vec::new();
    let mut remaining = multiplier;

    while remaining > ATEMPO_MAX {
        stages.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        stages.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    stages.push(remaining);

    Ok(stages)
}

/// Render stages as a comma separated `atempo` filter chain.
pub fn atempo_filter(stages: &[f64]) -> String {
    stages
        .iter()
        .map(|stage| format!("atempo={}", stage))
        .collect::<Vec<_>>()
        .join(",")
}
