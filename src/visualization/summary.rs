//! Numbers behind the histogram and box-plot shapes

use crate::utils::stats;
use serde::{Deserialize, Serialize};

/// Equal-width bins spanning the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinCounts {
    pub lo: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl BinCounts {
    pub fn hi(&self) -> f64 {
        self.lo + self.width * self.counts.len() as f64
    }

    /// `[start, end)` of bin `i`
    pub fn edges(&self, i: usize) -> (f64, f64) {
        let start = self.lo + self.width * i as f64;
        (start, start + self.width)
    }
}

/// Count `values` into `bins` equal-width bins over `[min, max]`.
///
/// The last bin is closed on the right. A constant column gets a unit-wide range
/// centred on its value. Non-finite values are skipped.
pub fn bin_counts(values: &[f64], bins: usize) -> Option<BinCounts> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo <= 0.0 {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(BinCounts { lo, width, counts })
}

/// Five-number summary plus outliers, Tukey style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`
    pub whisker_lo: f64,
    /// Largest value within `q3 + 1.5 * IQR`
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = stats::quantile(&sorted, 0.25)?;
    let median = stats::quantile(&sorted, 0.5)?;
    let q3 = stats::quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let (fence_lo, fence_hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = sorted.iter().copied().filter(|v| (fence_lo..=fence_hi).contains(v));
    let whisker_lo = inside.clone().next().unwrap_or(q1);
    let whisker_hi = inside.last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(fence_lo..=fence_hi).contains(v))
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_lo,
        whisker_hi,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_counts_cover_all_values() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = bin_counts(&values, 10).unwrap();

        assert_eq!(bins.counts.len(), 10);
        assert_eq!(bins.counts.iter().sum::<usize>(), 100);
        assert_eq!(bins.lo, 0.0);
        assert!((bins.hi() - 99.0).abs() < 1e-9);
        // 99 lands in the closed last bin
        assert_eq!(bins.counts[9], 10);
    }

    #[test]
    fn test_bin_counts_constant_and_empty() {
        let bins = bin_counts(&[3.0, 3.0, 3.0], 30).unwrap();
        assert_eq!(bins.counts.iter().sum::<usize>(), 3);
        assert!((bins.lo - 2.5).abs() < 1e-12);

        assert!(bin_counts(&[], 30).is_none());
        assert!(bin_counts(&[f64::NAN], 30).is_none());
    }

    #[test]
    fn test_box_stats_outliers() {
        let mut values: Vec<f64> = (1..=9).map(f64::from).collect();
        values.push(100.0);
        let b = box_stats(&values).unwrap();

        assert!((b.q1 - 3.25).abs() < 1e-12);
        assert!((b.median - 5.5).abs() < 1e-12);
        assert!((b.q3 - 7.75).abs() < 1e-12);
        assert_eq!(b.whisker_lo, 1.0);
        assert_eq!(b.whisker_hi, 9.0);
        assert_eq!(b.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(box_stats(&[]).is_none());
    }
}
