//! Value coercion for flag columns.

use crate::error::Result;
use crate::utils::parse_numeric_str;
use polars::prelude::*;

/// Coerce a series of any supported dtype to `f64` values.
///
/// Strings are trimmed and parsed, booleans become 1.0 / 0.0, and numeric
/// columns are cast. Anything unparseable and `NaN` become `None`.
pub(crate) fn coerce_to_f64(series: &Series) -> Result<Vec<Option<f64>>> {
    match series.dtype() {
        DataType::String => {
            let str_series = series.str()?;
            Ok(str_series
                .into_iter()
                .map(|v| v.and_then(parse_numeric_str))
                .collect())
        }
        DataType::Boolean => {
            let bool_series = series.bool()?;
            Ok(bool_series
                .into_iter()
                .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
                .collect())
        }
        _ => {
            let float_series = series.cast(&DataType::Float64)?;
            Ok(float_series
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect())
        }
    }
}

/// Map a value onto the flag domain: strictly positive is 1, anything else 0.
#[inline]
pub(crate) fn threshold_flag(value: f64) -> i64 {
    if value > 0.0 { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_strings() {
        let series = Series::new("flag".into(), &[Some("1"), Some(" -3 "), Some("x"), None, Some("0.5")]);
        assert_eq!(
            coerce_to_f64(&series).unwrap(),
            vec![Some(1.0), Some(-3.0), None, None, Some(0.5)]
        );
    }

    #[test]
    fn test_coerce_booleans() {
        let series = Series::new("flag".into(), &[Some(true), Some(false), None]);
        assert_eq!(
            coerce_to_f64(&series).unwrap(),
            vec![Some(1.0), Some(0.0), None]
        );
    }

    #[test]
    fn test_coerce_numeric_drops_nan() {
        let series = Series::new("flag".into(), &[1.0, f64::NAN, 2.0]);
        assert_eq!(coerce_to_f64(&series).unwrap(), vec![Some(1.0), None, Some(2.0)]);

        let ints = Series::new("flag".into(), &[Some(0i64), None, Some(7)]);
        assert_eq!(coerce_to_f64(&ints).unwrap(), vec![Some(0.0), None, Some(7.0)]);
    }

    #[test]
    fn test_threshold_flag() {
        assert_eq!(threshold_flag(1.0), 1);
        assert_eq!(threshold_flag(0.5), 1);
        assert_eq!(threshold_flag(0.0), 0);
        assert_eq!(threshold_flag(-3.0), 0);
    }
}
