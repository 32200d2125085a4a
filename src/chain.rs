//! The chain data model: one polypeptide chain from one structure,
//! its classification, and the annotation rows the classifier consumes.

use crate::residue::ResidueSlot;
use serde::{Deserialize, Serialize};

/// `{normal, substitution, chimera, delins, mismatch}` — the sum type the
/// Mutation Classifier (component B) produces, and the type that drives
/// partitioning for the three analysis subsets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum MutationClass {
    /// No classifiable sequence differences from the reference.
    Normal,
    /// Exactly one engineered point mutation relative to the reference.
    Substitution,
    /// The chain cross-references the reference more than once (two
    /// reference segments in one chain).
    Chimera,
    /// Duplicate structure-side or reference-side residue numbers indicate
    /// an insertion/deletion pattern rather than a pure substitution.
    Delins,
    /// The chain does not cross-reference the reference at all.
    Mismatch,
}

/// Which of the three comparison-mode subsets a chain
/// classified as `label` belongs to. The comparison-mode driver itself is
/// out of the core's scope, but the partitioning logic is a pure function
/// of the classifier's output, so it lives here.
#[must_use]
pub fn analysis_subsets(label: MutationClass) -> &'static [AnalysisSubset] {
    match label {
        MutationClass::Normal => &[AnalysisSubset::Normal, AnalysisSubset::Combined],
        MutationClass::Substitution => &[AnalysisSubset::Substitution, AnalysisSubset::Combined],
        MutationClass::Chimera | MutationClass::Delins | MutationClass::Mismatch => &[],
    }
}

/// One of the three comparison-mode subsets a driver may run the engine
/// against.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum AnalysisSubset {
    /// Only chains classified `normal`.
    Normal,
    /// Only chains classified `substitution`.
    Substitution,
    /// Both `normal` and `substitution` chains.
    Combined,
}

/// A single sequence-difference annotation row relative to the reference.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DiffAnnotation {
    /// The chain identifier this annotation applies to.
    pub chain_id: String,
    /// The structure-side residue number, or `None` for the "?" sentinel
    /// (a deletion marker).
    pub structure_residue_number: Option<i64>,
    /// The reference-side residue number, or `None` for the "?" sentinel
    /// (an insertion marker).
    pub reference_residue_number: Option<i64>,
    /// The detail token describing the kind of difference (e.g. `"engineered mutation"`).
    pub detail: String,
}

/// Non-difference detail tokens dropped before classification.
pub const IGNORED_DETAILS: [&str; 4] = [
    "expression tag",
    "linker",
    "conflict",
    "microheterogeneity",
];

/// The detail token that provisionally classifies a chain as `substitution`.
pub const ENGINEERED_MUTATION: &str = "engineered mutation";

/// One polypeptide chain from one structure.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Chain {
    /// The structure this chain belongs to.
    pub structure_id: String,
    /// The chain identifier within the structure.
    pub chain_id: String,
    /// The experimental method used to determine the structure.
    pub method: String,
    /// The resolution in Ångström, if applicable (e.g. absent for NMR).
    pub resolution: Option<f64>,
    /// 1-based, inclusive alignment span into the reference sequence.
    pub begin: usize,
    /// 1-based, inclusive alignment span into the reference sequence.
    pub end: usize,
    /// The classification assigned by component B.
    pub classification: MutationClass,
    /// The per-residue sequence, of length `end - begin + 1`.
    pub sequence: Vec<ResidueSlot>,
}

impl Chain {
    /// The length of this chain's observed span (`end - begin + 1`).
    #[must_use]
    pub const fn span_len(&self) -> usize {
        self.end - self.begin + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsets_partition_as_documented() {
        assert_eq!(
            analysis_subsets(MutationClass::Normal),
            &[AnalysisSubset::Normal, AnalysisSubset::Combined]
        );
        assert_eq!(
            analysis_subsets(MutationClass::Substitution),
            &[AnalysisSubset::Substitution, AnalysisSubset::Combined]
        );
        assert!(analysis_subsets(MutationClass::Chimera).is_empty());
        assert!(analysis_subsets(MutationClass::Delins).is_empty());
        assert!(analysis_subsets(MutationClass::Mismatch).is_empty());
    }
}
