//! Component D — Coordinate Assembler.
//!
//! Populates the Residue Coordinate Table from per-chain α-carbon atom
//! records, applying the alternate-location and polymer-only admission
//! rules before the residue-number keyed lookup.

use crate::rct::{AlignedResidues, ChainColumn, ResidueCoordinateTable};
use std::collections::HashMap;

/// One raw atom record, as produced by `structure_parser` or read
/// from the coordinate cache.
#[derive(Clone, PartialEq, Debug)]
pub struct AtomRecord {
    /// The structure-assigned residue number.
    pub residue_number: i64,
    /// The atom name (e.g. `"CA"`).
    pub atom_name: String,
    /// Cartesian coordinate.
    pub xyz: [f64; 3],
    /// The alternate-location code, or `None`/blank if not applicable.
    pub alt_code: Option<char>,
    /// Whether this record is tagged as a polymer atom (as opposed to a
    /// ligand/water/heteroatom record).
    pub is_polymer: bool,
}

/// Reduce a chain's raw atom records to one α-carbon coordinate per residue
/// number:
///
/// - only polymer-tagged records are admitted,
/// - only `"CA"` atoms are kept,
/// - a record with a non-blank alternate-location code is kept over a
///   blank-coded one for the same residue; among equally-coded candidates
///   the first in file order wins (ties are not otherwise specified).
#[must_use]
pub fn build_ca_table(records: &[AtomRecord]) -> HashMap<i64, [f64; 3]> {
    let mut table: HashMap<i64, (bool, [f64; 3])> = HashMap::new();

    for record in records {
        if !record.is_polymer || record.atom_name != "CA" {
            continue;
        }
        let has_alt_code = record
            .alt_code
            .is_some_and(|c| c != ' ' && c != '\0');

        match table.get(&record.residue_number) {
            None => {
                table.insert(record.residue_number, (has_alt_code, record.xyz));
            }
            Some((existing_has_alt, _)) => {
                if has_alt_code && !existing_has_alt {
                    table.insert(record.residue_number, (has_alt_code, record.xyz));
                }
            }
        }
    }

    table.into_iter().map(|(k, (_, xyz))| (k, xyz)).collect()
}

/// Populate the Residue Coordinate Table from aligned residues and each
/// chain's CA coordinate table, keyed by residue number.
///
/// A row whose residue slot is missing, or whose residue number has no
/// entry in the chain's coordinate table, is assigned a missing coordinate.
/// This naturally reproduces the pad/truncate behaviour described in spec
/// §4.D: rows past the end of a short coordinate table, or rows whose
/// residue numbers were never recorded, fall back to missing without a
/// separate positional reconciliation pass.
#[must_use]
#[tracing::instrument(skip(aligned, coordinate_tables))]
pub fn assemble(
    aligned: &AlignedResidues,
    coordinate_tables: &[HashMap<i64, [f64; 3]>],
) -> ResidueCoordinateTable {
    let chains = aligned
        .chain_columns
        .iter()
        .zip(aligned.chain_ids.iter())
        .zip(coordinate_tables.iter())
        .map(|((residues, chain_id), table)| {
            let coordinates = residues
                .iter()
                .map(|slot| {
                    slot.residue_number()
                        .and_then(|residue_number| table.get(&residue_number).copied())
                })
                .collect();
            ChainColumn {
                chain_id: chain_id.clone(),
                residues: residues.clone(),
                coordinates,
            }
        })
        .collect();

    ResidueCoordinateTable {
        reference: aligned.reference.clone(),
        chains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residue::{AminoAcid, ResidueSlot};
    use crate::rct::AlignedResidues;

    fn atom(residue_number: i64, atom_name: &str, xyz: [f64; 3], alt: Option<char>, polymer: bool) -> AtomRecord {
        AtomRecord {
            residue_number,
            atom_name: atom_name.to_string(),
            xyz,
            alt_code: alt,
            is_polymer: polymer,
        }
    }

    #[test]
    fn keeps_only_polymer_ca_atoms() {
        let records = vec![
            atom(1, "CA", [1.0, 0.0, 0.0], None, true),
            atom(1, "CB", [9.0, 9.0, 9.0], None, true),
            atom(2, "CA", [2.0, 0.0, 0.0], None, false),
        ];
        let table = build_ca_table(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(table[&1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn alt_location_code_wins_over_blank() {
        let records = vec![
            atom(1, "CA", [0.0, 0.0, 0.0], None, true),
            atom(1, "CA", [1.0, 1.0, 1.0], Some('A'), true),
        ];
        let table = build_ca_table(&records);
        assert_eq!(table[&1], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn first_occurrence_wins_among_blanks() {
        let records = vec![
            atom(1, "CA", [0.0, 0.0, 0.0], None, true),
            atom(1, "CA", [5.0, 5.0, 5.0], None, true),
        ];
        let table = build_ca_table(&records);
        assert_eq!(table[&1], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn assemble_maps_residue_numbers_to_coordinates() {
        let aligned = AlignedResidues {
            reference: vec![AminoAcid::Ala, AminoAcid::Val],
            chain_columns: vec![vec![
                ResidueSlot::chain(AminoAcid::Ala, 10),
                ResidueSlot::chain(AminoAcid::Val, 11),
            ]],
            chain_ids: vec!["A".to_string()],
        };
        let mut table = HashMap::new();
        table.insert(10, [1.0, 2.0, 3.0]);
        let rct = assemble(&aligned, std::slice::from_ref(&table));
        assert_eq!(rct.chains[0].coordinates[0], Some([1.0, 2.0, 3.0]));
        assert_eq!(rct.chains[0].coordinates[1], None);
    }
}
