use census_common::{clean_number, format_fixed, round_half_up};
use proptest::prelude::*;

proptest! {
    #[test]
    fn rounding_stays_within_half_a_unit(value in 0.0f64..1.0e6, precision in 0u32..4) {
        let rounded = round_half_up(value, precision);
        let unit = 10f64.powi(-(precision as i32));
        prop_assert!((rounded - value).abs() <= unit / 2.0 + unit * 1e-4);
    }

    #[test]
    fn fixed_format_has_exact_decimals(value in 0.0f64..1.0e6, precision in 1u32..5) {
        let text = format_fixed(value, precision);
        let decimals = text.split('.').nth(1).map_or(0, str::len);
        prop_assert_eq!(decimals, precision as usize);
    }

    #[test]
    fn integers_survive_cleaning(value in 0u32..10_000_000) {
        prop_assert_eq!(clean_number(&value.to_string()), Some(f64::from(value)));
    }
}
