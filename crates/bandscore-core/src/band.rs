//! Percentage to IELTS band conversion.
//!
//! Uses the round-band table (9.0 down to a 3.0 floor). The alternative
//! half-band table (6.5 at 60% down to 4.0) is not supported.

use crate::error::ScoringError;

/// Descending `(minimum percentage, band)` thresholds.
pub const BAND_THRESHOLDS: [(f64, f64); 6] = [
    (90.0, 9.0),
    (80.0, 8.0),
    (70.0, 7.0),
    (60.0, 6.0),
    (50.0, 5.0),
    (40.0, 4.0),
];

/// Band awarded below the lowest threshold.
pub const FLOOR_BAND: f64 = 3.0;

/// Lowest and highest band a provider score is normalized into.
pub const MIN_BAND: f64 = 1.0;
pub const MAX_BAND: f64 = 9.0;

/// Convert `score` correct answers out of `total` questions into a band.
pub fn band_for_score(score: u32, total: u32) -> Result<f64, ScoringError> {
    if total == 0 {
        return Err(ScoringError::invalid(
            "total questions must be greater than zero",
        ));
    }
    Ok(band_for_percentage(percentage(score, total)))
}

/// `100 * score / total`. Callers guarantee `total > 0`.
pub fn percentage(score: u32, total: u32) -> f64 {
    100.0 * f64::from(score) / f64::from(total)
}

pub fn band_for_percentage(percentage: f64) -> f64 {
    BAND_THRESHOLDS
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, band)| *band)
        .unwrap_or(FLOOR_BAND)
}

/// Clamp a provider-reported band to `[1.0, 9.0]` and round it to the
/// nearest half band. Returns `None` for NaN or infinite input.
pub fn normalize_band(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let clamped = value.clamp(MIN_BAND, MAX_BAND);
    Some((clamped * 2.0).round() / 2.0)
}
