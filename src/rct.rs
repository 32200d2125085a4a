//! Component A — the Residue Coordinate Table (RCT) and the intermediate
//! aligned-residue table that feeds it (the output of component C, before
//! component D populates coordinates).

use crate::residue::{AminoAcid, ResidueSlot};
use serde::{Deserialize, Serialize};

/// The output of the Sequence Aligner/Trimmer (component C): the reference
/// column plus `K` chain columns, already row-aligned and trimmed to `N`
/// rows. Coordinates are not yet attached.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AlignedResidues {
    /// The reference sequence restricted to the `N` surviving rows.
    pub reference: Vec<AminoAcid>,
    /// One column per surviving chain, each of length `N`.
    pub chain_columns: Vec<Vec<ResidueSlot>>,
    /// The chain identifiers, in acceptance order, parallel to
    /// `chain_columns`.
    pub chain_ids: Vec<String>,
}

impl AlignedResidues {
    /// `N`: the number of surviving residue rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.reference.len()
    }

    /// `K`: the number of chain columns.
    #[must_use]
    pub fn num_chains(&self) -> usize {
        self.chain_columns.len()
    }
}

/// A single chain's column in the Residue Coordinate Table: its residue
/// tokens (or missing) paired with α-carbon coordinates (or missing),
/// row-aligned to the table's `N` rows.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ChainColumn {
    /// The chain identifier.
    pub chain_id: String,
    /// The residue token at each of the `N` rows.
    pub residues: Vec<ResidueSlot>,
    /// The α-carbon coordinate at each of the `N` rows, or `None` if the
    /// residue is missing or its coordinate could not be resolved.
    pub coordinates: Vec<Option<[f64; 3]>>,
}

/// The Residue Coordinate Table: the aligned table over `N`
/// rows with the reference column and `K` chain columns, each chain column
/// pairing a residue token with a coordinate.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ResidueCoordinateTable {
    /// The reference sequence, `N` rows.
    pub reference: Vec<AminoAcid>,
    /// The `K` chain columns, each of length `N`.
    pub chains: Vec<ChainColumn>,
}

impl ResidueCoordinateTable {
    /// `N`: the number of residue rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.reference.len()
    }

    /// `K`: the number of chain columns.
    #[must_use]
    pub fn num_chains(&self) -> usize {
        self.chains.len()
    }
}
