//! Component B — Mutation Classifier.
//!
//! Classifies a structure's chain(s) relative to the reference sequence,
//! deterministically, from annotation rows describing sequence differences
//!. Open question resolved here: *microheterogeneity*
//! is treated purely as an ignored detail token at step 3 — it never
//! receives a separate override to `normal`. If it is the only detail
//! present, step 4 already yields `normal`, which is the only place the
//! spec's parenthetical ("microheterogeneity... elsewhere maps to normal")
//! can refer to without introducing a second, conflicting override path.

use crate::chain::{DiffAnnotation, MutationClass, ENGINEERED_MUTATION, IGNORED_DETAILS};
use std::collections::{HashMap, HashSet};

fn has_duplicate(sorted: &[i64]) -> bool {
    sorted.windows(2).any(|pair| pair[0] == pair[1])
}

/// Classify one structure's chain(s) against the reference.
///
/// `cross_referencing_chain_ids` is the (possibly duplicated) list of chain
/// identifiers that cross-reference the reference protein for this
/// structure; a duplicated identifier means two reference segments landed
/// in the same chain (chimera). `annotations` is every sequence-difference
/// row recorded for this structure, across all of its chains.
#[must_use]
#[tracing::instrument(skip(annotations))]
pub fn classify(
    cross_referencing_chain_ids: &[String],
    annotations: &[DiffAnnotation],
) -> MutationClass {
    if cross_referencing_chain_ids.is_empty() {
        return MutationClass::Mismatch;
    }

    let mut seen = HashSet::new();
    for id in cross_referencing_chain_ids {
        if !seen.insert(id.as_str()) {
            return MutationClass::Chimera;
        }
    }

    let cross_ref_set: HashSet<&str> = cross_referencing_chain_ids
        .iter()
        .map(String::as_str)
        .collect();

    let remaining: Vec<&DiffAnnotation> = annotations
        .iter()
        .filter(|a| cross_ref_set.contains(a.chain_id.as_str()))
        .filter(|a| !IGNORED_DETAILS.contains(&a.detail.as_str()))
        .collect();

    if remaining.is_empty() {
        return MutationClass::Normal;
    }

    let provisional = if remaining.iter().any(|a| a.detail == ENGINEERED_MUTATION) {
        MutationClass::Substitution
    } else {
        MutationClass::Normal
    };

    let mut by_chain: HashMap<&str, Vec<&DiffAnnotation>> = HashMap::new();
    for row in &remaining {
        by_chain.entry(row.chain_id.as_str()).or_default().push(row);
    }

    for rows in by_chain.values() {
        let mut structure_numbers: Vec<i64> =
            rows.iter().filter_map(|a| a.structure_residue_number).collect();
        structure_numbers.sort_unstable();
        if has_duplicate(&structure_numbers) {
            return MutationClass::Delins;
        }

        let mut reference_numbers: Vec<i64> =
            rows.iter().filter_map(|a| a.reference_residue_number).collect();
        reference_numbers.sort_unstable();
        if has_duplicate(&reference_numbers) {
            return MutationClass::Delins;
        }
    }

    provisional
}
