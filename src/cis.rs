//! Component H — Cis Detector.
//!
//! Classifies each pair row by how many chains place it within the cis
//! distance threshold, and summarises the distributional statistics over
//! the eligible subset.

use crate::distance::PairRow;
use crate::scoring::PairScore;
use serde::{Deserialize, Serialize};

/// Summary produced by the cis detector for one engine run.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CisInfo {
    /// Mean of the row-level `mean` distance, over eligible pairs.
    pub cis_dist_mean: f64,
    /// Std of the row-level `mean` distance, over eligible pairs. Zero if
    /// fewer than two eligible pairs (same singleton convention as
    /// `pair_score_std`).
    pub cis_dist_std: f64,
    /// Mean of the row-level `score`, over eligible pairs.
    pub cis_score_mean: f64,
    /// Count of eligible pairs with zero trans cells across all chains.
    pub cis_num: usize,
    /// Count of eligible pairs with at least one cis and at least one trans
    /// cell.
    pub mix: usize,
    /// The eligible pair indices, rendered `"i, j"`.
    pub cis_pairs: Vec<String>,
    /// The distance threshold used, Å.
    pub threshold: f64,
}

/// Count cis/trans cells for one pair row against `threshold`, excluding
/// missing cells from both counts.
#[must_use]
fn cis_trans_counts(row: &PairRow, threshold: f64) -> (usize, usize) {
    let mut cis = 0;
    let mut trans = 0;
    for d in row.distances.iter().flatten() {
        if *d <= threshold {
            cis += 1;
        } else {
            trans += 1;
        }
    }
    (cis, trans)
}

/// Detect cis pairs and summarise.
///
/// `rows` and `scores` must be the same pair table in the same order (each
/// `PairScore` corresponds to the `PairRow` at the same position).
#[must_use]
#[tracing::instrument(skip(rows, scores))]
pub fn detect_cis_pairs(rows: &[PairRow], scores: &[PairScore], threshold: f64) -> CisInfo {
    let mut cis_num = 0;
    let mut mix = 0;
    let mut eligible_pairs = Vec::new();
    let mut eligible_means = Vec::new();
    let mut eligible_scores = Vec::new();

    for (row, score) in rows.iter().zip(scores.iter()) {
        let (cis, trans) = cis_trans_counts(row, threshold);
        if cis == 0 {
            continue;
        }
        eligible_pairs.push(format!("{}, {}", row.i, row.j));
        if let Some(mean) = score.mean {
            eligible_means.push(mean);
        }
        if let Some(s) = score.score {
            eligible_scores.push(s);
        }
        if trans == 0 {
            cis_num += 1;
        } else {
            mix += 1;
        }
    }

    if eligible_means.is_empty() {
        return CisInfo {
            cis_dist_mean: 0.0,
            cis_dist_std: 0.0,
            cis_score_mean: 0.0,
            cis_num,
            mix,
            cis_pairs: eligible_pairs,
            threshold,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let cis_dist_mean = eligible_means.iter().sum::<f64>() / eligible_means.len() as f64;
    let cis_dist_std = if eligible_means.len() < 2 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let denom = (eligible_means.len() - 1) as f64;
        let variance = eligible_means
            .iter()
            .map(|d| (d - cis_dist_mean).powi(2))
            .sum::<f64>()
            / denom;
        variance.sqrt()
    };
    #[allow(clippy::cast_precision_loss)]
    let cis_score_mean = if eligible_scores.is_empty() {
        0.0
    } else {
        eligible_scores.iter().sum::<f64>() / eligible_scores.len() as f64
    };

    CisInfo {
        cis_dist_mean,
        cis_dist_std,
        cis_score_mean,
        cis_num,
        mix,
        cis_pairs: eligible_pairs,
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(i: usize, j: usize, distances: Vec<Option<f64>>) -> PairRow {
        PairRow { i, j, distances }
    }

    fn score_for(row: &PairRow) -> PairScore {
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
        PairScore {
            i: row.i,
            j: row.j,
            mean: Some(mean),
            std: Some(1.0),
            score: Some(mean),
        }
    }

    /// Scenario S4: pair(1,2) distances `{3.2, 3.4, 3.6, 3.2,
    /// 5.0}`, threshold 3.8: one trans cell (5.0), so `cis_num = 0`, `mix =
    /// 1`.
    #[test]
    fn scenario_s4_cis_pair() {
        let rows = vec![row(
            1,
            2,
            vec![Some(3.2), Some(3.4), Some(3.6), Some(3.2), Some(5.0)],
        )];
        let scores: Vec<PairScore> = rows.iter().map(score_for).collect();
        let info = detect_cis_pairs(&rows, &scores, 3.8);
        assert_eq!(info.cis_num, 0);
        assert_eq!(info.mix, 1);
        assert_eq!(info.cis_pairs, vec!["1, 2".to_string()]);
    }

    #[test]
    fn fully_cis_pair_counts_toward_cis_num() {
        let rows = vec![row(0, 1, vec![Some(3.0), Some(3.1)])];
        let scores: Vec<PairScore> = rows.iter().map(score_for).collect();
        let info = detect_cis_pairs(&rows, &scores, 3.8);
        assert_eq!(info.cis_num, 1);
        assert_eq!(info.mix, 0);
    }

    #[test]
    fn all_trans_pair_is_ineligible() {
        let rows = vec![row(0, 1, vec![Some(10.0), Some(12.0)])];
        let scores: Vec<PairScore> = rows.iter().map(score_for).collect();
        let info = detect_cis_pairs(&rows, &scores, 3.8);
        assert_eq!(info.cis_num, 0);
        assert_eq!(info.mix, 0);
        assert!(info.cis_pairs.is_empty());
    }

    #[test]
    fn no_eligible_pairs_yields_zero_statistics() {
        let rows = vec![row(0, 1, vec![Some(10.0)])];
        let scores: Vec<PairScore> = rows.iter().map(score_for).collect();
        let info = detect_cis_pairs(&rows, &scores, 3.8);
        assert_eq!(info.cis_dist_mean, 0.0);
        assert_eq!(info.cis_dist_std, 0.0);
        assert_eq!(info.cis_score_mean, 0.0);
    }

    #[test]
    fn single_eligible_pair_reports_zero_std() {
        let rows = vec![row(0, 1, vec![Some(3.0)])];
        let scores: Vec<PairScore> = rows.iter().map(score_for).collect();
        let info = detect_cis_pairs(&rows, &scores, 3.8);
        assert_eq!(info.cis_dist_std, 0.0);
    }

    #[test]
    fn missing_cells_excluded_from_cis_trans_counts() {
        let rows = vec![row(0, 1, vec![Some(3.0), None, Some(5.0)])];
        let (cis, trans) = cis_trans_counts(&rows[0], 3.8);
        assert_eq!(cis, 1);
        assert_eq!(trans, 1);
    }
}
