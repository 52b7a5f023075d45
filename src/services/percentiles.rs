//! Percentile helpers for already-sorted slices.
//!
//! - Empty input => `None`.
//! - `percentile <= 0` => first element.
//! - `percentile >= 100` => last element.
//! - Otherwise the position `p / 100 * (len - 1)` is interpolated linearly
//!   between the two neighbouring elements.

/// Returns the linearly interpolated percentile of a slice sorted in
/// ascending order.
pub fn interpolated_sorted<T: Copy + Into<f64>>(sorted_values: &[T], percentile: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;

    if percentile.is_nan() {
        return None;
    }
    if percentile <= 0.0 {
        return Some(sorted_values[0].into());
    }
    if percentile >= 100.0 {
        return Some(sorted_values[last].into());
    }

    let position = (percentile / 100.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let lower_value: f64 = sorted_values[lower].into();
    let upper_value: f64 = sorted_values[upper].into();
    Some(lower_value + (upper_value - lower_value) * (position - lower as f64))
}

/// Formats a percentile as a report label, e.g. `85.0` => `"85%"`.
pub fn percentile_label(percentile: f64) -> String {
    format!("{percentile}%")
}
