//! Flag column normalization.
//!
//! Every configured flag column is coerced to numbers, filled with its mode,
//! and thresholded into {0, 1}.

mod converters;
mod flags;

pub use flags::BinaryNormalizer;
