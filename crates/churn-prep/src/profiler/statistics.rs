//! Column statistics.
//!
//! Everything here is a pure function of the values passed in. Stages call
//! these at entry on the current table state; nothing is cached between
//! stages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Most frequent value. Ties go to the value encountered first.
pub fn mode<T, I>(values: I) -> Option<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut positions: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();

    for value in values {
        match positions.get(&value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Mode of floating point values, compared bitwise (`-0.0` folds into `0.0`).
pub fn numeric_mode(values: &[f64]) -> Option<f64> {
    mode(values.iter().map(|v| (v + 0.0).to_bits())).map(f64::from_bits)
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sorted copy of the values.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of already-sorted values using linear interpolation between the
/// two closest ranks: `h = (n - 1) * q`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = h - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Drop missing entries.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Pearson correlation over the rows where both values are present. `None`
/// with fewer than two such rows or when either side is constant.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Summary statistics of a numeric column, over its non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Compute the summary. `None` when there are no values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let (min, max) = (*sorted.first()?, *sorted.last()?);
        Some(Self {
            count: sorted.len(),
            mean: mean(&sorted)?,
            median: quantile_sorted(&sorted, 0.5)?,
            q1: quantile_sorted(&sorted, 0.25)?,
            q3: quantile_sorted(&sorted, 0.75)?,
            min,
            max,
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Closed interval of non-outlier values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Bounds `[q1 - k*iqr, q3 + k*iqr]`.
    pub fn from_summary(summary: &NumericSummary, multiplier: f64) -> Self {
        let iqr = summary.iqr();
        Self {
            lower: summary.q1 - multiplier * iqr,
            upper: summary.q3 + multiplier * iqr,
        }
    }

    /// Whether the value lies inside the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_first_seen_wins_ties() {
        assert_eq!(mode(["b", "a", "a", "b"]), Some("b"));
        assert_eq!(mode(["Male", "Female", "Female"]), Some("Female"));
        assert_eq!(mode(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_numeric_mode() {
        assert_eq!(numeric_mode(&[1.0, -3.0, 0.0]), Some(1.0));
        assert_eq!(numeric_mode(&[0.0, 2.0, 2.0, 0.0, 2.0]), Some(2.0));
        assert_eq!(numeric_mode(&[-0.0, 0.0, 5.0]), Some(0.0));
        assert_eq!(numeric_mode(&[]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        // Reference values from pandas Series.quantile (linear).
        let values = sorted(&(1..=10).rev().map(f64::from).collect::<Vec<_>>());
        assert_eq!(quantile_sorted(&values, 0.25), Some(3.25));
        assert_eq!(quantile_sorted(&values, 0.75), Some(7.75));
        assert_eq!(quantile_sorted(&values, 0.5), Some(5.5));
        assert_eq!(quantile_sorted(&values, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&values, 1.0), Some(10.0));
        assert_eq!(quantile_sorted(&values, 1.5), None);
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_summary_median() {
        let odd = NumericSummary::from_values(&[3.0, 1.0, 2.0]).unwrap();
        let even = NumericSummary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(odd.median, 2.0);
        assert_eq!(even.median, 2.5);
    }

    #[test]
    fn test_summary_and_bounds() {
        let summary = NumericSummary::from_values(&[10.0, 12.0, 11.0, 13.0, 1000.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.q1, 11.0);
        assert_eq!(summary.q3, 13.0);
        assert_eq!(summary.median, 12.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 1000.0);
        assert_eq!(summary.iqr(), 2.0);

        let bounds = IqrBounds::from_summary(&summary, 1.5);
        assert_eq!(bounds, IqrBounds { lower: 8.0, upper: 16.0 });
        assert!(bounds.contains(8.0));
        assert!(bounds.contains(16.0));
        assert!(!bounds.contains(1000.0));
    }

    #[test]
    fn test_summary_empty() {
        assert!(NumericSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_pearson() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), None];
        let ys = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-12);

        let neg = [Some(3.0), Some(2.0), Some(1.0), Some(0.0)];
        assert!((pearson(&xs, &neg).unwrap() + 1.0).abs() < 1e-12);

        assert_eq!(pearson(&xs, &[Some(5.0); 4]), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(1.0)]), None);
    }

    #[test]
    fn test_present_drops_missing() {
        assert_eq!(present(&[Some(1.0), None, Some(3.0)]), vec![1.0, 3.0]);
    }
}
