//! Component F — DSA Scorer.
//!
//! Reduces each pair row's per-chain distances to `(mean, std, score)`
//! across the ensemble. When the standard deviation of the
//! underlying distances is exactly zero, `10⁻⁴` is substituted *before*
//! forming the ratio — the substituted value is also what is reported back
//! as `std` (the substitution happens to the column, not just to the
//! division).

use crate::config::Ddof;
use crate::distance::PairTable;
use serde::{Deserialize, Serialize};

/// The fixed substitute used when a pair's standard deviation is exactly
/// zero.
pub const ZERO_STD_SUBSTITUTE: f64 = 1e-4;

/// One pair row's DSA statistics.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct PairScore {
    /// 0-based row index, `i < j`.
    pub i: usize,
    /// 0-based row index, `i < j`.
    pub j: usize,
    /// Mean distance across chains with a non-missing cell, or `None` if
    /// none exist.
    pub mean: Option<f64>,
    /// Standard deviation across chains (after zero-substitution), or
    /// `None` if there were no non-missing cells.
    pub std: Option<f64>,
    /// `mean / std`, or `None` if there were no non-missing cells.
    pub score: Option<f64>,
}

/// Standard deviation over `values`, using `ddof`'s denominator. Falls back
/// to the population denominator (`n`, here effectively `0.0`) when the
/// requested denominator (`n - ddof.delta()`) would be zero — a single
/// sample has no sample variance, so reporting `0.0` rather than `NaN`
/// keeps every downstream consumer total.
#[must_use]
pub fn std_dev(values: &[f64], ddof: Ddof) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / n as f64;
    let denom = n.saturating_sub(ddof.delta());
    if denom == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / denom as f64;
    variance.sqrt()
}

/// Compute `(mean, std, score)` for every pair row.
#[must_use]
#[tracing::instrument(skip(table))]
pub fn score_pairs(table: &PairTable, ddof: Ddof) -> Vec<PairScore> {
    table
        .rows
        .iter()
        .map(|row| {
            let observed: Vec<f64> = row.distances.iter().filter_map(|d| *d).collect();
            if observed.is_empty() {
                return PairScore {
                    i: row.i,
                    j: row.j,
                    mean: None,
                    std: None,
                    score: None,
                };
            }
            #[allow(clippy::cast_precision_loss)]
            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
            let raw_std = std_dev(&observed, ddof);
            let std = if raw_std == 0.0 {
                ZERO_STD_SUBSTITUTE
            } else {
                raw_std
            };
            PairScore {
                i: row.i,
                j: row.j,
                mean: Some(mean),
                std: Some(std),
                score: Some(mean / std),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::PairRow;

    fn table_of(rows: Vec<Vec<Option<f64>>>) -> PairTable {
        PairTable {
            n: 0,
            k: rows.first().map_or(0, Vec::len),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(idx, distances)| PairRow {
                    i: idx,
                    j: idx + 1,
                    distances,
                })
                .collect(),
        }
    }

    #[test]
    fn score_is_mean_over_substituted_std() {
        let table = table_of(vec![vec![Some(2.0), Some(2.0), Some(2.0)]]);
        let scores = score_pairs(&table, Ddof::Population);
        let s = scores[0];
        assert_eq!(s.mean, Some(2.0));
        assert_eq!(s.std, Some(ZERO_STD_SUBSTITUTE));
        assert_eq!(s.score, Some(2.0 / ZERO_STD_SUBSTITUTE));
    }

    #[test]
    fn no_observations_yields_missing() {
        let table = table_of(vec![vec![None, None]]);
        let scores = score_pairs(&table, Ddof::Population);
        assert_eq!(scores[0].mean, None);
        assert_eq!(scores[0].std, None);
        assert_eq!(scores[0].score, None);
    }

    #[test]
    fn missing_cells_are_excluded_from_mean_and_std() {
        let table = table_of(vec![vec![Some(1.0), None, Some(3.0)]]);
        let scores = score_pairs(&table, Ddof::Population);
        assert_eq!(scores[0].mean, Some(2.0));
    }

    /// Scenario S2: identical triplicate — every std is the
    /// substitute, every score is `mean * 1e4`.
    #[test]
    fn scenario_s2_identical_triplicate() {
        let table = table_of(vec![
            vec![Some(3.8), Some(3.8), Some(3.8)],
            vec![Some(7.6), Some(7.6), Some(7.6)],
            vec![Some(3.8), Some(3.8), Some(3.8)],
        ]);
        let scores = score_pairs(&table, Ddof::Population);
        for s in &scores {
            assert_eq!(s.std, Some(ZERO_STD_SUBSTITUTE));
            assert!((s.score.unwrap() - s.mean.unwrap() * 1e4).abs() < 1e-9);
        }
    }

    #[test]
    fn std_dev_population_vs_sample() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let pop = std_dev(&values, Ddof::Population);
        let sample = std_dev(&values, Ddof::Sample);
        assert!(sample > pop);
    }

    #[test]
    fn single_sample_sample_ddof_reports_zero_not_nan() {
        let values = [3.0];
        assert_eq!(std_dev(&values, Ddof::Sample), 0.0);
    }
}
