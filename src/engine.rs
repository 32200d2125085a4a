//! The engine entry point (`run()`) and its state machine.
//!
//! Orchestrates components A–I in a fixed forward sequence:
//! `Idle -> Collecting -> Classified -> Aligned -> Assembled ->
//! Scored -> Done`, with `Failed` reachable from any state. The states
//! themselves are not reified as a literal state machine value — Rust's
//! `Result`-propagating call sequence already enforces "strictly forward,
//! no backtracking" at compile time, which is a stronger guarantee than an
//! enum a caller could inspect mid-run. [`EngineState`] exists for
//! observability (it is what `tracing` spans are tagged with), not control
//! flow.

use crate::aggregate::{self, Heatmap};
use crate::aligner::{self, ChainAlignmentInput, Correction};
use crate::assembler::{self, AtomRecord};
use crate::chain::{Chain, DiffAnnotation, MutationClass};
use crate::cis;
use crate::classifier;
use crate::collaborators::{resolve_redirects, CrossRef, EnsembleSource, MetadataRecord};
use crate::config::EngineConfig;
use crate::csv::{self, CsvLine};
use crate::distance;
use crate::error::{EngineError, Result};
use crate::rct::ChainColumn;
use crate::residue::{AminoAcid, ResidueSlot};
use crate::result::{EngineResult, PairScoreEntry, PerResidueEntry};
use crate::scoring;
use std::collections::HashMap;

/// The run's logical phase, surfaced only through `tracing` (see module
/// docs).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EngineState {
    /// No work has started.
    Idle,
    /// Collecting and filtering cross-referencing structures.
    Collecting,
    /// Every accepted structure has been classified.
    Classified,
    /// The reference and chain columns have been aligned and trimmed.
    Aligned,
    /// Coordinates have been assembled into the Residue Coordinate Table.
    Assembled,
    /// Pair distances and scores have been computed.
    Scored,
    /// The result record has been assembled.
    Done,
}

/// The naive per-position sequence for an observed span, before applying
/// corrections: position `p` maps to the reference token at `p`, numbered
/// sequentially from `begin`. [`Correction`] values derived from the
/// structure's diff annotations (applied by component C) are what actually
/// move a position's residue number or drop it to missing when the
/// structure's own numbering diverges — this is only the starting point.
fn naive_chain_sequence(reference: &[AminoAcid], begin: usize, end: usize) -> Vec<ResidueSlot> {
    (begin..=end)
        .map(|pos| {
            reference
                .get(pos - 1)
                .map_or(ResidueSlot::Missing, |token| {
                    ResidueSlot::chain(*token, pos as i64)
                })
        })
        .collect()
}

/// Derive this structure's corrections from its diff annotation rows.
///
/// A `"?"` on the structure side (`structure_residue_number: None`) is a
/// deletion relative to the reference; a `"?"` on the reference side
/// (`reference_residue_number: None`) is an insertion. A reference position
/// annotated by more than one structure-side number is a structure-duplicate
/// delins; a structure position annotated by more than one reference-side
/// number is a reference-duplicate delins.
fn corrections_from_annotations(annotations: &[DiffAnnotation]) -> Vec<Correction> {
    let mut corrections = Vec::new();
    let mut by_reference_position: HashMap<i64, usize> = HashMap::new();
    let mut by_structure_position: HashMap<i64, usize> = HashMap::new();

    for annotation in annotations {
        match (
            annotation.structure_residue_number,
            annotation.reference_residue_number,
        ) {
            (None, Some(reference_position)) => {
                corrections.push(Correction::Deletion {
                    #[allow(clippy::cast_sign_loss)]
                    reference_position: reference_position as usize,
                });
            }
            (Some(structure_position), None) => {
                corrections.push(Correction::Insertion {
                    #[allow(clippy::cast_sign_loss)]
                    structure_position: structure_position as usize,
                });
            }
            (Some(structure_position), Some(reference_position)) => {
                *by_reference_position.entry(reference_position).or_insert(0) += 1;
                *by_structure_position.entry(structure_position).or_insert(0) += 1;
            }
            (None, None) => {}
        }
    }

    for (reference_position, count) in by_reference_position {
        if count > 1 {
            corrections.push(Correction::DelinsStructureDuplicate {
                #[allow(clippy::cast_sign_loss)]
                reference_position: reference_position as usize,
                count,
            });
        }
    }
    for (structure_position, count) in by_structure_position {
        if count > 1 {
            #[allow(clippy::cast_sign_loss)]
            corrections.push(Correction::DelinsReferenceDuplicate {
                reference_position: structure_position as usize,
                count,
            });
        }
    }

    corrections
}

const RESIDUE_NUMBER_KEYS: [&str; 4] = ["residue_number", "resnum", "res_num", "resSeq"];
const ATOM_NAME_KEYS: [&str; 2] = ["atom_name", "atom"];
const ALT_CODE_KEYS: [&str; 3] = ["alt_code", "alt_loc", "altloc"];
const GROUP_TAG_KEYS: [&str; 2] = ["group_tag", "group_PDB"];

fn first_present<'a>(line: &'a CsvLine, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| line.get(k))
}

/// Which column to read a residue number from: the canonical key list,
/// falling back to a header whose name merely looks like one (e.g. a
/// cache file spelling it `"Residue Number"`).
fn resolve_residue_number_column(headers: &[String]) -> Option<String> {
    headers
        .iter()
        .find(|h| RESIDUE_NUMBER_KEYS.contains(&h.as_str()))
        .or_else(|| headers.iter().find(|h| csv::looks_like_residue_number_column(h)))
        .cloned()
}

/// Whether a chain's coordinate column reconciles with its residue column:
/// trivially true if the chain has no observed residues to reconcile,
/// otherwise true iff at least one observed residue resolved a coordinate.
/// Zero resolutions out of at least one observed residue means the
/// coordinate cache file does not correspond to this chain at all.
fn chain_reconciles(column: &ChainColumn) -> bool {
    let observed = column.residues.iter().filter(|r| !r.is_missing()).count();
    if observed == 0 {
        return true;
    }
    column.coordinates.iter().any(Option::is_some)
}

/// Read one structure's coordinate-cache CSV into an α-carbon coordinate
/// table keyed by residue number.
fn load_coordinate_table<S: EnsembleSource>(
    source: &S,
    structure_id: &str,
) -> Result<HashMap<i64, [f64; 3]>> {
    let path = source.coord_cache_dir().join(format!("{structure_id}.csv"));
    let contents = std::fs::read_to_string(&path).map_err(|e| {
        EngineError::collaborator(format!("reading coordinate cache for {structure_id}"), e)
    })?;
    let lines = csv::parse(&contents)?;

    let headers = lines.first().map(CsvLine::column_names).unwrap_or_default();
    let xyz_columns = csv::resolve_xyz_columns(&headers);
    let residue_number_column = resolve_residue_number_column(&headers);

    let mut records = Vec::with_capacity(lines.len());
    for line in &lines {
        let residue_number_raw = first_present(line, &RESIDUE_NUMBER_KEYS)
            .or_else(|| residue_number_column.as_deref().and_then(|c| line.get(c)));
        let Some(residue_number_raw) = residue_number_raw else {
            continue;
        };
        let Ok(residue_number) = residue_number_raw.parse::<i64>() else {
            continue;
        };
        let Some(atom_name) = first_present(line, &ATOM_NAME_KEYS) else {
            continue;
        };

        let Some((x, y, z)) = xyz_columns.as_ref() else {
            continue;
        };
        let xyz = match (line.get(x), line.get(y), line.get(z)) {
            (Some(xv), Some(yv), Some(zv)) => {
                match (xv.parse(), yv.parse(), zv.parse()) {
                    (Ok(xv), Ok(yv), Ok(zv)) => Some([xv, yv, zv]),
                    _ => None,
                }
            }
            _ => None,
        };
        let Some(xyz) = xyz else { continue };

        let alt_code = first_present(line, &ALT_CODE_KEYS)
            .and_then(|s| s.chars().next())
            .filter(|c| !c.is_whitespace());
        let is_polymer = match first_present(line, &GROUP_TAG_KEYS) {
            Some(tag) => tag.eq_ignore_ascii_case("ATOM"),
            None => true,
        };

        records.push(AtomRecord {
            residue_number,
            atom_name: atom_name.to_string(),
            xyz,
            alt_code,
            is_polymer,
        });
    }

    Ok(assembler::build_ca_table(&records))
}

/// Run the ensemble DSA pipeline against `reference_id`.
///
/// # Errors
/// Returns a terminal [`EngineError`] variant; local recovery policies
/// (silent redirect resolution, per-structure drop-and-continue) are
/// applied before any of these surface.
#[tracing::instrument(skip(source, config))]
pub fn run<S: EnsembleSource>(
    reference_id: &str,
    config: &EngineConfig,
    source: &S,
) -> Result<EngineResult> {
    tracing::info!(state = ?EngineState::Idle, reference_id, "starting run");

    tracing::info!(state = ?EngineState::Collecting, "resolving identifier");
    let (resolved_id, record) = resolve_redirects(source, reference_id)?;
    let resolved_id_for_result = if resolved_id == reference_id {
        None
    } else {
        Some(resolved_id.clone())
    };
    let MetadataRecord::Active {
        sequence,
        cross_refs,
        ..
    } = record
    else {
        unreachable!("resolve_redirects only returns Active records")
    };

    let reference: Vec<AminoAcid> = sequence.chars().map(AminoAcid::from_one_letter).collect();
    let full_sequence_length = reference.len();

    let eligible: Vec<&CrossRef> = cross_refs
        .iter()
        .filter(|cr| config.method_filter.accepts(&cr.method))
        .take(config.max_structures)
        .collect();
    if eligible.is_empty() {
        return Err(EngineError::NoStructures {
            reference_id: resolved_id,
        });
    }

    tracing::info!(state = ?EngineState::Classified, candidates = eligible.len(), "classifying candidates");
    let mut accepted = Vec::new();
    let mut excluded_structure_ids = Vec::new();

    for cross_ref in eligible {
        let Some(file_path) = source.structure_downloader(&cross_ref.structure_id)? else {
            tracing::debug!(structure_id = %cross_ref.structure_id, "structure not available, dropping");
            excluded_structure_ids.push(cross_ref.structure_id.clone());
            continue;
        };
        let parsed = match source.structure_parser(&file_path) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(structure_id = %cross_ref.structure_id, %error, "parse failed, dropping");
                excluded_structure_ids.push(cross_ref.structure_id.clone());
                continue;
            }
        };

        let classification = classifier::classify(&parsed.cross_ref_rows, &parsed.diff_annotation_rows);
        if classification == MutationClass::Mismatch {
            tracing::debug!(structure_id = %cross_ref.structure_id, "classified as mismatch, dropping");
            excluded_structure_ids.push(cross_ref.structure_id.clone());
            continue;
        }

        let (begin, end) = cross_ref.alignment_span;
        let chain = Chain {
            structure_id: cross_ref.structure_id.clone(),
            chain_id: cross_ref.structure_id.clone(),
            method: cross_ref.method.clone(),
            resolution: cross_ref.resolution,
            begin,
            end,
            classification,
            sequence: naive_chain_sequence(&reference, begin, end),
        };
        let corrections = corrections_from_annotations(&parsed.diff_annotation_rows);
        accepted.push((chain, corrections));
    }

    if accepted.len() < 2 {
        return Err(EngineError::TooFewAcceptedStructures {
            accepted: accepted.len(),
        });
    }

    let (aligned, rct) = loop {
        tracing::info!(state = ?EngineState::Aligned, "aligning and trimming");
        let chain_inputs: Vec<ChainAlignmentInput> = accepted
            .iter()
            .map(|(chain, corrections)| ChainAlignmentInput {
                chain_id: chain.structure_id.clone(),
                begin: chain.begin,
                end: chain.end,
                sequence: chain.sequence.clone(),
                corrections: corrections.clone(),
            })
            .collect();
        let aligned = aligner::align_and_trim(&reference, &chain_inputs, config.seq_ratio)?;

        tracing::info!(state = ?EngineState::Assembled, "assembling coordinates");
        let mut coordinate_tables = Vec::with_capacity(accepted.len());
        for (chain, _) in &accepted {
            coordinate_tables.push(load_coordinate_table(source, &chain.structure_id)?);
        }
        let rct = assembler::assemble(&aligned, &coordinate_tables);

        // Coordinate-file residue-count mismatch recovery: a chain
        // whose column has observed residues but not one of them resolved a
        // coordinate means its coordinate cache file does not reconcile
        // with the alignment at all (most likely the wrong file). Drop it
        // and restart trimming from the reduced set.
        let mismatched: Vec<usize> = rct
            .chains
            .iter()
            .enumerate()
            .filter(|(_, column)| !chain_reconciles(column))
            .map(|(idx, _)| idx)
            .collect();

        if mismatched.is_empty() {
            break (aligned, rct);
        }

        let mismatch_details: Vec<(String, usize)> = mismatched
            .iter()
            .map(|&idx| {
                let expected = rct.chains[idx]
                    .residues
                    .iter()
                    .filter(|r| !r.is_missing())
                    .count();
                (accepted[idx].0.structure_id.clone(), expected)
            })
            .collect();

        for &idx in mismatched.iter().rev() {
            let structure_id = accepted[idx].0.structure_id.clone();
            tracing::warn!(structure_id = %structure_id, "residue count mismatch, dropping and restarting trim");
            excluded_structure_ids.push(structure_id);
            accepted.remove(idx);
        }
        if accepted.len() < 2 {
            let (structure_id, expected) = mismatch_details
                .into_iter()
                .next()
                .expect("mismatched is non-empty here");
            return Err(EngineError::ResidueCountMismatch {
                structure_id,
                expected,
                actual: 0,
            });
        }
    };

    let mean_resolution = {
        let resolutions: Vec<f64> = accepted
            .iter()
            .filter_map(|(chain, _)| chain.resolution)
            .collect();
        if resolutions.is_empty() {
            None
        } else {
            #[allow(clippy::cast_precision_loss)]
            Some(resolutions.iter().sum::<f64>() / resolutions.len() as f64)
        }
    };

    tracing::info!(state = ?EngineState::Scored, "scoring pairs");
    let pair_table = distance::compute_pair_distances(&rct);
    let scores = scoring::score_pairs(&pair_table, config.ddof);

    let n = rct.num_rows();
    let umf = aggregate::umf(&scores)?;
    let (pair_score_mean, pair_score_std) = aggregate::pair_statistics(&scores);
    let per_residue = aggregate::per_residue_scores(&scores, n);
    let heatmap: Heatmap = aggregate::build_heatmap(&scores, n);
    let cis_info = cis::detect_cis_pairs(&pair_table.rows, &scores, config.cis_threshold);

    let pair_scores: Vec<PairScoreEntry> = pair_table
        .rows
        .iter()
        .zip(scores.iter())
        .map(|(row, score)| PairScoreEntry {
            i: row.i,
            j: row.j,
            residue_pair: format!("{}, {}", row.i, row.j),
            distance_mean: score.mean,
            distance_std: score.std,
            score: score.score,
        })
        .collect();

    let per_residue_scores: Vec<PerResidueEntry> = aligned
        .reference
        .iter()
        .zip(per_residue.iter())
        .enumerate()
        .map(|(index, (token, score))| PerResidueEntry {
            index,
            residue_number: None,
            residue_name: token.three_letter_code().to_string(),
            score: *score,
        })
        .collect();

    tracing::info!(state = ?EngineState::Done, "run complete");
    Ok(EngineResult {
        reference_id: reference_id.to_string(),
        resolved_id: resolved_id_for_result,
        num_structures: aligned.num_chains(),
        num_residues: n,
        full_sequence_length,
        #[allow(clippy::cast_precision_loss)]
        residue_coverage_percent: 100.0 * n as f64 / full_sequence_length.max(1) as f64,
        num_chains: aligned.num_chains(),
        used_structure_ids: accepted
            .iter()
            .map(|(chain, _)| chain.structure_id.clone())
            .collect(),
        excluded_structure_ids,
        seq_ratio: config.seq_ratio,
        method: config.method_filter,
        mean_resolution,
        umf,
        pair_score_mean,
        pair_score_std,
        pair_scores,
        per_residue_scores,
        heatmap,
        cis_info,
    })
}
