//! Component G — Aggregators.
//!
//! Reduces the per-pair `(mean, std, score)` table (component F) down to the
//! ensemble-level Unified Mobility Factor, pair statistics, per-residue
//! scores, and the symmetric heatmap.

use crate::error::EngineError;
use crate::scoring::PairScore;
use serde::{Deserialize, Serialize};

/// `(pair_score_mean, pair_score_std)` over finite pair scores.
///
/// `pair_score_std` always uses denominator `n - 1` regardless of the
/// configured [`crate::config::Ddof`]. When exactly one finite
/// score exists the sample denominator is zero, reported as zero rather
/// than undefined.
#[must_use]
pub fn pair_statistics(scores: &[PairScore]) -> (f64, f64) {
    let finite: Vec<f64> = scores.iter().filter_map(|s| s.score).collect();
    if finite.is_empty() {
        return (0.0, 0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let denom = finite.len() - 1;
    if denom == 0 {
        return (mean, 0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let variance = finite.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / denom as f64;
    (mean, variance.sqrt())
}

/// UMF: the arithmetic mean of `score` over all pair rows with a finite
/// score. Fails with [`EngineError::NoValidScores`] if none
/// exist.
///
/// # Errors
/// Returns [`EngineError::NoValidScores`] if no pair row has a finite
/// score.
pub fn umf(scores: &[PairScore]) -> Result<f64, EngineError> {
    let finite: Vec<f64> = scores.iter().filter_map(|s| s.score).collect();
    if finite.is_empty() {
        return Err(EngineError::NoValidScores);
    }
    #[allow(clippy::cast_precision_loss)]
    Ok(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// One residue's reduced mobility score: the mean of `score` over every
/// pair row where this residue index is an endpoint, restricted to finite
/// scores. `None` if no qualifying pair exists.
#[must_use]
pub fn per_residue_scores(scores: &[PairScore], n: usize) -> Vec<Option<f64>> {
    let mut sums = vec![0.0_f64; n];
    let mut counts = vec![0_usize; n];
    for s in scores {
        if let Some(v) = s.score {
            sums[s.i] += v;
            counts[s.i] += 1;
            sums[s.j] += v;
            counts[s.j] += 1;
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count == 0 {
                None
            } else {
                #[allow(clippy::cast_precision_loss)]
                Some(sum / count as f64)
            }
        })
        .collect()
}

/// The symmetric `N x N` score heatmap: `H[i,j] = H[j,i] =
/// score_ij`, diagonal `NaN`. Off-diagonal cells with no recorded score
/// (e.g. a pair whose row had no non-missing distances) are also `NaN`,
/// consistent with the *Missing* unification — the heatmap has no
/// separate "absent pair" representation from "NaN score".
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Heatmap {
    /// `N`, the side length.
    pub size: usize,
    /// Row-major `N * N` values; `NaN` on the diagonal and for unscored
    /// pairs.
    pub values: Vec<f64>,
}

impl Heatmap {
    /// Cell `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }
}

/// Build the heatmap from the pair score table.
#[must_use]
pub fn build_heatmap(scores: &[PairScore], n: usize) -> Heatmap {
    let mut values = vec![f64::NAN; n * n];
    for s in scores {
        let v = s.score.unwrap_or(f64::NAN);
        values[s.i * n + s.j] = v;
        values[s.j * n + s.i] = v;
    }
    Heatmap { size: n, values }
}
