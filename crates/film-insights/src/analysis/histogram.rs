use crate::types::HistogramBin;

/// Split `values` into `bins` equal-width buckets spanning their range.
///
/// The last bucket is closed on the right so the maximum is counted. A
/// constant input is widened to `[v - 0.5, v + 0.5]`. Non-finite values are
/// ignored; no finite values yields no buckets.
pub fn equal_width_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_cover_range() {
        let bins = equal_width_bins(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);

        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0], HistogramBin { lower: 0.0, upper: 2.0, count: 2 });
        assert_eq!(bins[1], HistogramBin { lower: 2.0, upper: 4.0, count: 3 });
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let bins = equal_width_bins(&[10.0, 20.0, 30.0], 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins[29].count, 1);
        assert_eq!(bins[0].count, 1);
    }

    #[test]
    fn test_constant_values() {
        let bins = equal_width_bins(&[90.0, 90.0], 4);
        assert_eq!(bins.first().unwrap().lower, 89.5);
        assert_eq!(bins.last().unwrap().upper, 90.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert!(equal_width_bins(&[], 10).is_empty());
        assert!(equal_width_bins(&[f64::NAN], 10).is_empty());
        assert_eq!(equal_width_bins(&[1.0, f64::NAN], 1)[0].count, 1);
    }
}
