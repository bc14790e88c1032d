//! Shared helpers for dtype classification and series construction.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a raw cell as a number. Surrounding whitespace is ignored; empty
/// strings, `NaN` and anything `f64::from_str` rejects give `None`.
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

// =============================================================================
// Series Construction
// =============================================================================

/// Float64 series with every missing entry replaced by `fill_value`.
pub fn fill_numeric_nulls(name: &str, values: &[Option<f64>], fill_value: f64) -> Series {
    let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
    Series::new(name.into(), filled)
}

/// String series with every missing entry replaced by `fill_value`.
pub fn fill_string_nulls(name: &str, values: &[Option<String>], fill_value: &str) -> Series {
    let filled: Vec<String> = values
        .iter()
        .map(|v| v.clone().unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Series::new(name.into(), filled)
}
