//! Component I — Result Assembler.
//!
//! Packages the output of components A–H into the one structured result
//! record a `run()` call returns.
//!
//! Non-finite `f64` fields (`NaN`, missing means/scores) serialise as JSON
//! `null` and deserialise back to `NaN` — this is `serde_json`'s built-in
//! behaviour for non-finite floats, so no custom (de)serializer is needed
//! here; the JSON round-trip falls out of that for free.

use crate::aggregate::Heatmap;
use crate::cis::CisInfo;
use crate::config::MethodFilter;
use serde::{Deserialize, Serialize};

/// One entry in the per-pair scores list.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PairScoreEntry {
    /// 0-based row index, `i < j`.
    pub i: usize,
    /// 0-based row index, `i < j`.
    pub j: usize,
    /// `"{i}, {j}"`, matching the cis detector's pair label format.
    pub residue_pair: String,
    /// Mean distance, `null` if the row had no non-missing cells.
    pub distance_mean: Option<f64>,
    /// Standard deviation (after zero-substitution), `null` if the row had
    /// no non-missing cells.
    pub distance_std: Option<f64>,
    /// `mean / std`, `null` if the row had no non-missing cells.
    pub score: Option<f64>,
}

/// One entry in the per-residue scores list.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PerResidueEntry {
    /// 0-based row index into the Residue Coordinate Table.
    pub index: usize,
    /// The structure-assigned residue number, if the reference column
    /// carries one (normally `None`; the reference is numbered by the
    /// chains, not itself).
    pub residue_number: Option<i64>,
    /// The three-letter residue name.
    pub residue_name: String,
    /// Mean of finite `score` over pairs touching this residue, `null` if
    /// none qualify.
    pub score: Option<f64>,
}

/// The one structured result record an engine run produces.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct EngineResult {
    /// The identifier the caller originally supplied.
    pub reference_id: String,
    /// The identifier actually processed, if a metadata redirect resolved
    /// to a different active record.
    pub resolved_id: Option<String>,
    /// `K`: the number of chains accepted into the ensemble.
    pub num_structures: usize,
    /// `N`: the number of residue rows after trimming.
    pub num_residues: usize,
    /// `L`: the full reference sequence length, pre-trimming.
    pub full_sequence_length: usize,
    /// `100 * N / L`.
    pub residue_coverage_percent: f64,
    /// `K`, duplicated under the name the result record uses.
    pub num_chains: usize,
    /// Structure identifiers accepted into the final ensemble, in
    /// acceptance order.
    pub used_structure_ids: Vec<String>,
    /// Structure identifiers dropped along the way, with the reason lost
    /// to the aggregate (recovery is silent; the identifier is all that is
    /// retained).
    pub excluded_structure_ids: Vec<String>,
    /// The `seq_ratio` this run used.
    pub seq_ratio: f64,
    /// The experimental method filter this run used.
    pub method: MethodFilter,
    /// Mean resolution (Å) over accepted *distinct* structures; `None` if
    /// no accepted structure reports a resolution (e.g. an all-NMR
    /// ensemble).
    pub mean_resolution: Option<f64>,
    /// The Unified Mobility Factor.
    pub umf: f64,
    /// Mean of finite pair scores.
    pub pair_score_mean: f64,
    /// Sample standard deviation of finite pair scores.
    pub pair_score_std: f64,
    /// Per-pair statistics.
    pub pair_scores: Vec<PairScoreEntry>,
    /// Per-residue reduced scores.
    pub per_residue_scores: Vec<PerResidueEntry>,
    /// The symmetric score heatmap.
    pub heatmap: Heatmap,
    /// The cis-pair summary.
    pub cis_info: CisInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Heatmap;
    use crate::cis::CisInfo;
    use crate::config::EngineConfig;

    fn sample_result() -> EngineResult {
        EngineResult {
            reference_id: "OLD".to_string(),
            resolved_id: Some("NEW".to_string()),
            num_structures: 3,
            num_residues: 10,
            full_sequence_length: 12,
            residue_coverage_percent: 100.0 * 10.0 / 12.0,
            num_chains: 3,
            used_structure_ids: vec!["1abc".to_string()],
            excluded_structure_ids: vec![],
            seq_ratio: 0.9,
            method: MethodFilter::Xray,
            mean_resolution: Some(1.8),
            umf: 4.2,
            pair_score_mean: 4.0,
            pair_score_std: 0.5,
            pair_scores: vec![PairScoreEntry {
                i: 0,
                j: 1,
                residue_pair: "0, 1".to_string(),
                distance_mean: Some(3.8),
                distance_std: None,
                score: None,
            }],
            per_residue_scores: vec![PerResidueEntry {
                index: 0,
                residue_number: None,
                residue_name: "ALA".to_string(),
                score: None,
            }],
            heatmap: Heatmap {
                size: 2,
                values: vec![f64::NAN, 4.2, 4.2, f64::NAN],
            },
            cis_info: CisInfo {
                cis_dist_mean: 0.0,
                cis_dist_std: 0.0,
                cis_score_mean: 0.0,
                cis_num: 0,
                mix: 0,
                cis_pairs: vec![],
                threshold: 3.8,
            },
        }
    }

    #[test]
    fn json_round_trip_preserves_nan_as_null() {
        let result = sample_result();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"distance_std\":null"));
        assert!(json.contains("null")); // heatmap diagonal

        let parsed: EngineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.reference_id, result.reference_id);
        assert_eq!(parsed.heatmap.values[1], result.heatmap.values[1]);
        assert!(parsed.heatmap.values[0].is_nan());
    }

    #[test]
    fn config_method_filter_round_trips_in_result() {
        let cfg = EngineConfig::default();
        let result = EngineResult {
            method: cfg.method_filter,
            ..sample_result()
        };
        let json = serde_json::to_string(&result).unwrap();
        let parsed: EngineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.method, MethodFilter::Xray);
    }
}
