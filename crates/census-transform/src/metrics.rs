//! Derived measures. Zero denominators yield `0.0`, never an error.

use census_common::round_half_up;

/// `part / whole * 100`, rounded half-up to `precision` decimals.
pub fn percentage(part: f64, whole: f64, precision: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round_half_up(part / whole * 100.0, precision)
}

/// `Σ(measure * weight) / total`, rounded half-up to `precision` decimals.
pub fn composite_index(weighted: &[(f64, f64)], total: f64, precision: u32) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let sum: f64 = weighted.iter().map(|(measure, weight)| measure * weight).sum();
    round_half_up(sum / total, precision)
}

/// Absolute and relative change from `start` to `end`.
///
/// The relative change is `0.0` when `start` is zero.
pub fn variation(start: f64, end: f64, precision: u32) -> (f64, f64) {
    let absolute = round_half_up(end - start, precision);
    let relative = percentage(end - start, start, precision);
    (absolute, relative)
}

/// Compound annual growth rate in percent:
/// `((end / start) ^ (1 / years) - 1) * 100`.
///
/// `None` when `years` is not positive or the ratio is negative; `0.0`
/// when `start` is zero.
pub fn cagr(start: f64, end: f64, years: i32, precision: u32) -> Option<f64> {
    if years <= 0 {
        return None;
    }
    if start == 0.0 {
        return Some(0.0);
    }
    let ratio = end / start;
    if ratio < 0.0 || !ratio.is_finite() {
        return None;
    }
    let rate = (ratio.powf(1.0 / f64::from(years)) - 1.0) * 100.0;
    Some(round_half_up(rate, precision))
}
