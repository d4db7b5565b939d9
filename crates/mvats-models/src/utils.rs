//! Rounding helpers for reported values.

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Confidences are reported with 4 decimals.
pub fn round_confidence(value: f64) -> f64 {
    round_to(value, 4)
}

/// Times and durations are reported with 2 decimals.
pub fn round_seconds(value: f64) -> f64 {
    round_to(value, 2)
}

/// Percentages are reported with 1 decimal.
pub fn round_percentage(value: f64) -> f64 {
    round_to(value, 1)
}
