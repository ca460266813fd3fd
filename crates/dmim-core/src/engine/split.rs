//! Label-stratified train/test partitioning.
//!
//! The continuous label is cut into six ordered strata at its quartiles and the
//! two inter-quartile midpoints, then a single seeded shuffle split keeps each
//! stratum's share (up to rounding) in both partitions.

use super::error::DatasetError;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Number of strata produced by [`stratify`].
pub const STRATUM_COUNT: usize = 6;

/// Disjoint row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// The `q`-th percentile (0..=100) using linear interpolation between order statistics.
pub fn percentile(values: &[f64], q: f64) -> Result<f64, DatasetError> {
    if values.is_empty() {
        return Err(DatasetError::Empty(
            "cannot take a percentile of no values".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(DatasetError::InvalidConfiguration(format!(
            "percentile {} is outside 0..=100",
            q
        )));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Cut points `[Q1, (Q1+Q2)/2, Q2, (Q2+Q3)/2, Q3]`.
pub fn stratification_bounds(labels: &[f64]) -> Result<[f64; STRATUM_COUNT - 1], DatasetError> {
    let q1 = percentile(labels, 25.0)?;
    let q2 = percentile(labels, 50.0)?;
    let q3 = percentile(labels, 75.0)?;
    Ok([q1, (q1 + q2) / 2.0, q2, (q2 + q3) / 2.0, q3])
}

/// Assigns each label the number of cut points at or below it (0..=5).
pub fn stratify(labels: &[f64]) -> Result<Vec<usize>, DatasetError> {
    let bounds = stratification_bounds(labels)?;
    Ok(labels
        .iter()
        .map(|&y| bounds.iter().filter(|&&b| b <= y).count())
        .collect())
}

/// Test-set size for `n` rows; at least one row must remain on each side.
pub fn test_size(n: usize, test_fraction: f64) -> Result<usize, DatasetError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidConfiguration(format!(
            "test fraction must be strictly between 0 and 1, got {}",
            test_fraction
        )));
    }
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DatasetError::InvalidConfiguration(format!(
            "test fraction {} leaves an empty partition for {} rows",
            test_fraction, n
        )));
    }
    Ok(n_test)
}

/// Splits rows so each class of `classes` keeps its share in both partitions.
///
/// Per-class test counts are `n_test * count / n` rounded down, with the leftover
/// rows handed to the classes with the largest remainders (lower class first on
/// ties). Within a class, members are shuffled with a ChaCha8 stream seeded from
/// `seed`, so the result depends only on the inputs.
#[instrument(level = "debug", skip(classes), fields(n = classes.len()))]
pub fn stratified_shuffle_split(
    classes: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, DatasetError> {
    let n = classes.len();
    let n_test = test_size(n, test_fraction)?;

    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &class) in classes.iter().enumerate() {
        members.entry(class).or_default().push(row);
    }

    let mut allocation: Vec<(usize, usize, usize)> = members
        .iter()
        .map(|(&class, rows)| {
            let quota = n_test * rows.len();
            (class, quota / n, quota % n)
        })
        .collect();
    let assigned: usize = allocation.iter().map(|&(_, k, _)| k).sum();
    let mut by_remainder: Vec<usize> = (0..allocation.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        allocation[b]
            .2
            .cmp(&allocation[a].2)
            .then(allocation[a].0.cmp(&allocation[b].0))
    });
    for &slot in by_remainder.iter().take(n_test - assigned) {
        allocation[slot].1 += 1;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (class, k, _) in allocation {
        let Some(rows) = members.get_mut(&class) else {
            continue;
        };
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..k]);
        train.extend_from_slice(&rows[k..]);
        debug!(class, size = rows.len(), test = k, "Allocated stratum.");
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(n: usize) -> Vec<f64> {
        // deterministic, unsorted, with a long upper tail
        (0..n)
            .map(|i| {
                let x = ((i * 37) % n) as f64;
                100.0 + x + if x > 0.8 * n as f64 { 2.0 * x } else { 0.0 }
            })
            .collect()
    }

    fn shares(classes: &[usize], rows: &[usize]) -> [f64; STRATUM_COUNT] {
        let mut counts = [0.0; STRATUM_COUNT];
        for &r in rows {
            counts[classes[r]] += 1.0;
        }
        counts.map(|c| c / rows.len() as f64)
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 100.0).unwrap(), 4.0);
        assert_eq!(percentile(&values, 50.0).unwrap(), 2.5);
        assert_eq!(percentile(&values, 25.0).unwrap(), 1.75);
        assert!(matches!(percentile(&[], 50.0), Err(DatasetError::Empty(_))));
    }

    #[test]
    fn bounds_include_interquartile_midpoints() {
        let values: Vec<f64> = (0..=8).map(|i| i as f64).collect();
        let bounds = stratification_bounds(&values).unwrap();
        assert_eq!(bounds, [2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn stratify_counts_bounds_at_or_below() {
        let values: Vec<f64> = (0..=8).map(|i| i as f64).collect();
        let classes = stratify(&values).unwrap();
        assert_eq!(classes, vec![0, 0, 1, 2, 3, 4, 5, 5, 5]);
    }

    #[test]
    fn same_seed_gives_identical_split() {
        let classes = stratify(&labels(200)).unwrap();
        let a = stratified_shuffle_split(&classes, 0.2, 42).unwrap();
        let b = stratified_shuffle_split(&classes, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = stratified_shuffle_split(&classes, 0.2, 43).unwrap();
        let a_test: HashSet<_> = a.test.iter().collect();
        let c_test: HashSet<_> = c.test.iter().collect();
        assert_ne!(a_test, c_test);
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let classes = stratify(&labels(101)).unwrap();
        let split = stratified_shuffle_split(&classes, 0.2, 7).unwrap();
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn strata_proportions_are_preserved() {
        let classes = stratify(&labels(200)).unwrap();
        let all: Vec<usize> = (0..200).collect();
        let full = shares(&classes, &all);
        for seed in [1, 2, 3] {
            let split = stratified_shuffle_split(&classes, 0.2, seed).unwrap();
            let train = shares(&classes, &split.train);
            let test = shares(&classes, &split.test);
            for k in 0..STRATUM_COUNT {
                assert!((train[k] - full[k]).abs() <= 0.05, "train stratum {}", k);
                assert!((test[k] - full[k]).abs() <= 0.05, "test stratum {}", k);
            }
        }
    }

    #[test]
    fn rejects_degenerate_fractions() {
        let classes = vec![0; 10];
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                stratified_shuffle_split(&classes, fraction, 0),
                Err(DatasetError::InvalidConfiguration(_))
            ));
        }
        assert!(matches!(
            stratified_shuffle_split(&[0], 0.5, 0),
            Err(DatasetError::InvalidConfiguration(_))
        ));
    }
}
