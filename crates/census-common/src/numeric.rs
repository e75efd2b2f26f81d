//! Number cleaning and rounding.

/// Cells that statistical offices use for "no value" (confidential, not
/// applicable, not available, ...).
const CONVENTIONAL_SIGNS: &[&str] = &["-", "--", "x", "X", "..", "...", "…", "§", "//", "n.d.", "nd", "NA", "n/a"];

/// Returns true for cells that denote a missing value by convention.
pub fn is_conventional_sign(value: &str) -> bool {
    CONVENTIONAL_SIGNS.contains(&value.trim())
}

/// Parses a raw measure cell written in Portuguese or plain notation.
///
/// `"1.234,56"` -> 1234.56, `"3,7%"` -> 3.7, `"9 504"` -> 9504,
/// `"9.504"` -> 9504 (a single dot followed by exactly three digits is a
/// thousands separator), `"12.5"` -> 12.5. Empty cells and conventional
/// signs return `None`.
pub fn clean_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches('\u{feff}');
    if trimmed.is_empty() || is_conventional_sign(trimmed) {
        return None;
    }
    let compact: String = trimmed
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '%' && *ch != '\u{202f}')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let dots = compact.matches('.').count();
    let commas = compact.matches(',').count();
    let normalized = match (dots, commas) {
        (0, 0) => compact,
        (_, 0) if dots > 1 => compact.replace('.', ""),
        (1, 0) => {
            let decimals = compact.rsplit('.').next().map_or(0, str::len);
            let int_part = compact.split('.').next().unwrap_or_default();
            let looks_grouped = decimals == 3
                && !int_part.trim_start_matches('-').is_empty()
                && !int_part.trim_start_matches('-').starts_with('0');
            if looks_grouped {
                compact.replace('.', "")
            } else {
                compact
            }
        }
        (0, _) if commas > 1 => compact.replace(',', ""),
        (0, 1) => compact.replace(',', "."),
        _ => {
            // both present: the right-most one is the decimal mark
            let last_dot = compact.rfind('.').unwrap_or(0);
            let last_comma = compact.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                compact.replace('.', "").replace(',', ".")
            } else {
                compact.replace(',', "")
            }
        }
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Rounds half away from zero to `precision` decimals.
///
/// The value is first snapped to four extra decimals so binary
/// representation noise (`2.675` stored as `2.67499...`) does not flip a
/// tie downwards.
pub fn round_half_up(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    let snapped = (scaled * 1e4).round() / 1e4;
    let rounded = snapped.round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Formats with exactly `precision` decimals after half-up rounding.
pub fn format_fixed(value: f64, precision: u32) -> String {
    format!("{:.*}", precision as usize, round_half_up(value, precision))
}

/// Formats without a fractional part when the value is integral.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_portuguese_notation() {
        assert_eq!(clean_number("1.234,56"), Some(1234.56));
        assert_eq!(clean_number("3,7%"), Some(3.7));
        assert_eq!(clean_number(" 9 504 "), Some(9504.0));
        assert_eq!(clean_number("9\u{a0}504"), Some(9504.0));
        assert_eq!(clean_number("9.504"), Some(9504.0));
        assert_eq!(clean_number("1.234.567"), Some(1_234_567.0));
        assert_eq!(clean_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(clean_number("1,234.5"), Some(1234.5));
    }

    #[test]
    fn keeps_plain_decimals() {
        assert_eq!(clean_number("12.5"), Some(12.5));
        assert_eq!(clean_number("0.125"), Some(0.125));
        assert_eq!(clean_number("-4"), Some(-4.0));
    }

    #[test]
    fn conventional_signs_are_missing() {
        for raw in ["", "  ", "-", "x", "..", "…", "§"] {
            assert_eq!(clean_number(raw), None, "{raw:?}");
        }
        assert_eq!(clean_number("abc"), None);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(2.675, 2), 2.68);
        assert_eq!(round_half_up(1.005, 2), 1.01);
        assert_eq!(round_half_up(33.333_333, 2), 33.33);
        assert_eq!(round_half_up(66.666_666, 2), 66.67);
        assert_eq!(round_half_up(-0.001, 2), 0.0);
    }

    #[test]
    fn formats_fixed_and_plain() {
        assert_eq!(format_fixed(12.5, 2), "12.50");
        assert_eq!(format_fixed(0.0, 2), "0.00");
        assert_eq!(format_fixed(99.995, 2), "100.00");
        assert_eq!(format_plain(9504.0), "9504");
        assert_eq!(format_plain(2.5), "2.5");
    }
}
