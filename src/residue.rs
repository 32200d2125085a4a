//! Residue tokens: the twenty standard amino acids plus the unknown
//! sentinel, with their three-letter and one-letter codes.
//!
//! One variant per amino acid, each carrying its own doc comment and a
//! `Display` impl, scoped down to the lookup table this engine actually
//! needs — no mass, fragmentation, or formula chemistry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the twenty standard amino acids, or the unknown/ambiguous
/// sentinel used for residues the classifier or aligner could not resolve.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum AminoAcid {
    /// Alanine
    Ala,
    /// Cysteine
    Cys,
    /// Aspartate
    Asp,
    /// Glutamate
    Glu,
    /// Phenylalanine
    Phe,
    /// Glycine
    Gly,
    /// Histidine
    His,
    /// Isoleucine
    Ile,
    /// Lysine
    Lys,
    /// Leucine
    Leu,
    /// Methionine
    Met,
    /// Asparagine
    Asn,
    /// Proline
    Pro,
    /// Glutamine
    Gln,
    /// Arginine
    Arg,
    /// Serine
    Ser,
    /// Threonine
    Thr,
    /// Valine
    Val,
    /// Tryptophan
    Trp,
    /// Tyrosine
    Tyr,
    /// Selenocysteine
    Sec,
    /// Hydroxyproline
    Hyp,
    /// Unknown or ambiguous residue.
    Unk,
}

impl AminoAcid {
    /// Parse a three-letter code (case-insensitive). Unrecognised codes
    /// resolve to [`AminoAcid::Unk`].
    #[must_use]
    pub fn from_three_letter(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "ALA" => Self::Ala,
            "CYS" => Self::Cys,
            "ASP" => Self::Asp,
            "GLU" => Self::Glu,
            "PHE" => Self::Phe,
            "GLY" => Self::Gly,
            "HIS" => Self::His,
            "ILE" => Self::Ile,
            "LYS" => Self::Lys,
            "LEU" => Self::Leu,
            "MET" => Self::Met,
            "ASN" => Self::Asn,
            "PRO" => Self::Pro,
            "GLN" => Self::Gln,
            "ARG" => Self::Arg,
            "SER" => Self::Ser,
            "THR" => Self::Thr,
            "VAL" => Self::Val,
            "TRP" => Self::Trp,
            "TYR" => Self::Tyr,
            "SEC" => Self::Sec,
            "HYP" => Self::Hyp,
            _ => Self::Unk,
        }
    }

    /// Parse a one-letter code (case-insensitive), as used in a plain
    /// sequence string. Unrecognised codes resolve to [`AminoAcid::Unk`].
    #[must_use]
    pub fn from_one_letter(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'A' => Self::Ala,
            'C' => Self::Cys,
            'D' => Self::Asp,
            'E' => Self::Glu,
            'F' => Self::Phe,
            'G' => Self::Gly,
            'H' => Self::His,
            'I' => Self::Ile,
            'K' => Self::Lys,
            'L' => Self::Leu,
            'M' => Self::Met,
            'N' => Self::Asn,
            'P' => Self::Pro,
            'Q' => Self::Gln,
            'R' => Self::Arg,
            'S' => Self::Ser,
            'T' => Self::Thr,
            'V' => Self::Val,
            'W' => Self::Trp,
            'Y' => Self::Tyr,
            'U' => Self::Sec,
            'O' => Self::Hyp,
            _ => Self::Unk,
        }
    }

    /// The three-letter code for this residue.
    #[must_use]
    pub const fn three_letter_code(self) -> &'static str {
        match self {
            Self::Ala => "ALA",
            Self::Cys => "CYS",
            Self::Asp => "ASP",
            Self::Glu => "GLU",
            Self::Phe => "PHE",
            Self::Gly => "GLY",
            Self::His => "HIS",
            Self::Ile => "ILE",
            Self::Lys => "LYS",
            Self::Leu => "LEU",
            Self::Met => "MET",
            Self::Asn => "ASN",
            Self::Pro => "PRO",
            Self::Gln => "GLN",
            Self::Arg => "ARG",
            Self::Ser => "SER",
            Self::Thr => "THR",
            Self::Val => "VAL",
            Self::Trp => "TRP",
            Self::Tyr => "TYR",
            Self::Sec => "SEC",
            Self::Hyp => "HYP",
            Self::Unk => "UNK",
        }
    }

    /// The one-letter code for this residue.
    #[must_use]
    pub const fn one_letter_code(self) -> char {
        match self {
            Self::Ala => 'A',
            Self::Cys => 'C',
            Self::Asp => 'D',
            Self::Glu => 'E',
            Self::Phe => 'F',
            Self::Gly => 'G',
            Self::His => 'H',
            Self::Ile => 'I',
            Self::Lys => 'K',
            Self::Leu => 'L',
            Self::Met => 'M',
            Self::Asn => 'N',
            Self::Pro => 'P',
            Self::Gln => 'Q',
            Self::Arg => 'R',
            Self::Ser => 'S',
            Self::Thr => 'T',
            Self::Val => 'V',
            Self::Trp => 'W',
            Self::Tyr => 'Y',
            Self::Sec => 'U',
            Self::Hyp => 'O',
            Self::Unk => 'X',
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.three_letter_code())
    }
}

/// A single residue slot in the reference sequence or in an aligned chain
/// column: either a resolved amino acid token, or missing (unobserved,
/// deleted, inserted, or outside the chain's alignment span).
///
/// The source overloads several sentinels (`"?"`, `NaN`, `None`, empty
/// strings) for "missing" across layers; this type unifies all of them into
/// one sum variant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ResidueSlot {
    /// A resolved residue, tagged with its structure-assigned residue
    /// number (used to look up coordinates in component D).
    Present {
        /// The resolved amino acid.
        token: AminoAcid,
        /// The structure-assigned residue number, when this slot came from
        /// a chain rather than the reference column.
        residue_number: Option<i64>,
    },
    /// No residue observed at this slot.
    Missing,
}

impl ResidueSlot {
    /// The reference-column convenience constructor: a present token with
    /// no structure-assigned numbering.
    #[must_use]
    pub const fn reference(token: AminoAcid) -> Self {
        Self::Present {
            token,
            residue_number: None,
        }
    }

    /// A chain-column convenience constructor.
    #[must_use]
    pub const fn chain(token: AminoAcid, residue_number: i64) -> Self {
        Self::Present {
            token,
            residue_number: Some(residue_number),
        }
    }

    /// Whether this slot is missing.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The amino acid token, if present.
    #[must_use]
    pub const fn token(&self) -> Option<AminoAcid> {
        match self {
            Self::Present { token, .. } => Some(*token),
            Self::Missing => None,
        }
    }

    /// The structure-assigned residue number, if present and numbered.
    #[must_use]
    pub const fn residue_number(&self) -> Option<i64> {
        match self {
            Self::Present { residue_number, .. } => *residue_number,
            Self::Missing => None,
        }
    }
}
