//! Component C — Sequence Aligner/Trimmer.
//!
//! Builds a per-chain column of length `L` from each accepted chain's
//! observed span, applies the four correction kinds in the fixed order the
//! spec documents as load-bearing (deletion, insertion, delins-by-structure-
//! duplicate, delins-by-reference-duplicate — later steps index into the
//! in-progress column, so the order must be preserved exactly), concatenates
//! the columns beside the reference, and trims rows below the `seq_ratio`
//! occupancy threshold.

use crate::error::{EngineError, Result};
use crate::residue::{AminoAcid, ResidueSlot};
use crate::rct::AlignedResidues;

/// One correction applied to a chain's column before concatenation. Positions are 1-based reference-sequence positions unless
/// noted otherwise.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Correction {
    /// A structure-side "?" annotation: the structure skipped a residue the
    /// reference has. Insert a missing slot at `reference_position`,
    /// shifting everything downstream right by one (and truncating the
    /// tail to keep the column at length `L`).
    Deletion {
        /// 1-based position in the reference sequence.
        reference_position: usize,
    },
    /// A reference-side "?" annotation: the structure has an extra residue
    /// the reference does not. Remove the entry at `structure_position` in
    /// the column built so far, padding the tail with a missing slot to
    /// keep the column at length `L`.
    Insertion {
        /// 1-based position in the column as built so far.
        structure_position: usize,
    },
    /// Duplicate structure-side residue numbers resolving to the same
    /// reference slot: insert `count - 1` missing slots after
    /// `reference_position`.
    DelinsStructureDuplicate {
        /// 1-based position in the reference sequence.
        reference_position: usize,
        /// How many structure-side annotations duplicated this slot.
        count: usize,
    },
    /// Duplicate reference-side residue numbers: remove `count - 1` entries
    /// aligned to the duplicated `reference_position`.
    DelinsReferenceDuplicate {
        /// 1-based position in the reference sequence.
        reference_position: usize,
        /// How many reference-side annotations duplicated this slot.
        count: usize,
    },
}

/// One accepted chain's alignment input: its observed span into the
/// reference, its per-residue sequence, and any corrections to apply.
#[derive(Clone, PartialEq, Debug)]
pub struct ChainAlignmentInput {
    /// The chain identifier.
    pub chain_id: String,
    /// 1-based, inclusive start of the observed span into the reference.
    pub begin: usize,
    /// 1-based, inclusive end of the observed span into the reference.
    pub end: usize,
    /// The chain's observed per-residue sequence, length `end - begin + 1`.
    pub sequence: Vec<ResidueSlot>,
    /// Corrections to apply, in the order the annotations were recorded.
    /// Reordered internally into the fixed deletion/insertion/delins-struct/
    /// delins-ref phase order.
    pub corrections: Vec<Correction>,
}

fn build_initial_column(input: &ChainAlignmentInput, reference_len: usize) -> Vec<ResidueSlot> {
    let mut column = vec![ResidueSlot::Missing; reference_len];
    let start = input.begin.saturating_sub(1);
    for (offset, slot) in input.sequence.iter().enumerate() {
        let index = start + offset;
        if index < reference_len {
            column[index] = *slot;
        }
    }
    column
}

fn apply_deletion(column: &mut Vec<ResidueSlot>, reference_position: usize) {
    let index = reference_position.saturating_sub(1).min(column.len());
    column.insert(index, ResidueSlot::Missing);
    column.truncate(column.len() - 1);
}

fn apply_insertion(column: &mut Vec<ResidueSlot>, structure_position: usize) {
    let len = column.len();
    let index = structure_position.saturating_sub(1).min(len.saturating_sub(1));
    if len > 0 {
        column.remove(index);
    }
    column.push(ResidueSlot::Missing);
}

fn apply_delins_structure_duplicate(
    column: &mut Vec<ResidueSlot>,
    reference_position: usize,
    count: usize,
) {
    if count <= 1 {
        return;
    }
    let extra = count - 1;
    let index = reference_position.min(column.len());
    for _ in 0..extra {
        column.insert(index, ResidueSlot::Missing);
    }
    let new_len = column.len().saturating_sub(extra);
    column.truncate(new_len);
}

fn apply_delins_reference_duplicate(
    column: &mut Vec<ResidueSlot>,
    reference_position: usize,
    count: usize,
) {
    if count <= 1 {
        return;
    }
    let extra = count - 1;
    let start = reference_position.min(column.len());
    let end = (start + extra).min(column.len());
    column.drain(start..end);
    for _ in 0..extra {
        column.push(ResidueSlot::Missing);
    }
}

/// Apply one chain's corrections, in the fixed phase order, to its initial
/// column.
fn align_chain_column(input: &ChainAlignmentInput, reference_len: usize) -> Vec<ResidueSlot> {
    let mut column = build_initial_column(input, reference_len);

    for correction in &input.corrections {
        if let Correction::Deletion { reference_position } = correction {
            apply_deletion(&mut column, *reference_position);
        }
    }
    for correction in &input.corrections {
        if let Correction::Insertion { structure_position } = correction {
            apply_insertion(&mut column, *structure_position);
        }
    }
    for correction in &input.corrections {
        if let Correction::DelinsStructureDuplicate {
            reference_position,
            count,
        } = correction
        {
            apply_delins_structure_duplicate(&mut column, *reference_position, *count);
        }
    }
    for correction in &input.corrections {
        if let Correction::DelinsReferenceDuplicate {
            reference_position,
            count,
        } = correction
        {
            apply_delins_reference_duplicate(&mut column, *reference_position, *count);
        }
    }

    debug_assert_eq!(column.len(), reference_len);
    column
}

/// Align and trim a set of accepted chains against the reference sequence.
///
/// # Errors
/// Returns [`EngineError::InsufficientAlignment`] if, after trimming,
/// `N < 2` or `K < 3`.
#[tracing::instrument(skip(reference, chains))]
pub fn align_and_trim(
    reference: &[AminoAcid],
    chains: &[ChainAlignmentInput],
    seq_ratio: f64,
) -> Result<AlignedResidues> {
    let reference_len = reference.len();
    let k = chains.len();

    let columns: Vec<Vec<ResidueSlot>> = chains
        .iter()
        .map(|chain| align_chain_column(chain, reference_len))
        .collect();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let threshold = ((k as f64) * seq_ratio).floor() as usize;

    let mut kept_reference = Vec::new();
    let mut kept_columns: Vec<Vec<ResidueSlot>> = vec![Vec::new(); k];

    for row in 0..reference_len {
        let present_count = columns.iter().filter(|col| !col[row].is_missing()).count();
        if present_count >= threshold {
            kept_reference.push(reference[row]);
            for (chain_index, col) in columns.iter().enumerate() {
                kept_columns[chain_index].push(col[row]);
            }
        }
    }

    let n = kept_reference.len();
    if n < 2 || k < 3 {
        tracing::warn!(n, k, "insufficient alignment after trimming");
        return Err(EngineError::InsufficientAlignment { rows: n, chains: k });
    }

    Ok(AlignedResidues {
        reference: kept_reference,
        chain_columns: kept_columns,
        chain_ids: chains.iter().map(|c| c.chain_id.clone()).collect(),
    })
}
