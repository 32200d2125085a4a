//! External interfaces: the capability trait a driver implements
//! to supply metadata, structure files, parsed records, and the coordinate
//! cache, plus the redirect-chain resolution the engine performs over it.

use crate::assembler::AtomRecord;
use crate::chain::DiffAnnotation;
use crate::error::EngineError;
use std::path::{Path, PathBuf};

/// One cross-reference from a metadata record: a structure that deposits a
/// chain against the reference sequence.
#[derive(Clone, PartialEq, Debug)]
pub struct CrossRef {
    /// The structure identifier.
    pub structure_id: String,
    /// The experimental method (e.g. `"X-ray"`, `"NMR"`, `"EM"`).
    pub method: String,
    /// The resolution in Ångström, if applicable.
    pub resolution: Option<f64>,
    /// 1-based, inclusive alignment span into the reference sequence.
    pub alignment_span: (usize, usize),
}

/// The result of a `metadata_lookup` call.
#[derive(Clone, PartialEq, Debug)]
pub enum MetadataRecord {
    /// An active record: usable directly.
    Active {
        /// The canonical identifier for this record.
        primary_id: String,
        /// The full reference sequence.
        sequence: String,
        /// The structures cross-referencing this sequence.
        cross_refs: Vec<CrossRef>,
    },
    /// An inactive record: the lookup must be retried against one of
    /// `redirects` (merged-to or demerged-to successors).
    Inactive {
        /// The candidate successor identifiers, in preference order.
        redirects: Vec<String>,
    },
}

/// One structure's parsed records.
#[derive(Clone, PartialEq, Debug)]
pub struct ParsedStructure {
    /// The chain identifiers that cross-reference the reference sequence
    /// in this structure (component B input).
    pub cross_ref_rows: Vec<String>,
    /// The sequence-difference annotations for this structure's chains
    /// (component B input).
    pub diff_annotation_rows: Vec<DiffAnnotation>,
    /// The raw atom records for this structure (component D input).
    pub atom_records: Vec<AtomRecord>,
}

/// The four collaborators a driver supplies to an engine run.
///
/// Implementations may perform blocking I/O freely — the core never calls
/// these from within a parallel fork-join section, and the core
/// itself has no timers or cancellation.
pub trait EnsembleSource {
    /// Resolve an identifier to its metadata record.
    ///
    /// # Errors
    /// Returns [`EngineError::CollaboratorFailure`] if the lookup itself
    /// fails (network error, malformed response). An unrecognised inactive
    /// record is represented as `Ok(MetadataRecord::Inactive { .. })` with
    /// an empty `redirects`, not as an error — the engine turns that into
    /// [`EngineError::IdentifierUnresolved`] during redirect resolution.
    fn metadata_lookup(&self, id: &str) -> Result<MetadataRecord, EngineError>;

    /// Download a structure file, or `Ok(None)` if the structure is not
    /// available (e.g. a 404).
    ///
    /// # Errors
    /// Returns [`EngineError::CollaboratorFailure`] for any failure other
    /// than "not available".
    fn structure_downloader(&self, structure_id: &str) -> Result<Option<PathBuf>, EngineError>;

    /// Parse a downloaded structure file into its component records.
    ///
    /// # Errors
    /// Returns [`EngineError::CollaboratorFailure`] if the file cannot be
    /// parsed.
    fn structure_parser(&self, file_path: &Path) -> Result<ParsedStructure, EngineError>;

    /// The directory containing one coordinate-cache CSV per structure.
    fn coord_cache_dir(&self) -> &Path;
}

/// Follow the `metadata_lookup` redirect chain from `input` until an active
/// record is found. Returns the identifier the
/// active record was found at (the "resolved id") together with the
/// record itself.
///
/// # Errors
/// Returns [`EngineError::IdentifierUnresolved`] if the chain loops back to
/// an identifier already visited, or ends at an inactive record with no
/// further redirects.
#[tracing::instrument(skip(source))]
pub fn resolve_redirects<S: EnsembleSource>(
    source: &S,
    input: &str,
) -> Result<(String, MetadataRecord), EngineError> {
    let mut visited = Vec::new();
    let mut current = input.to_string();

    loop {
        if visited.contains(&current) {
            return Err(EngineError::IdentifierUnresolved {
                input: input.to_string(),
                chain: visited,
            });
        }
        visited.push(current.clone());

        match source.metadata_lookup(&current)? {
            record @ MetadataRecord::Active { .. } => return Ok((current, record)),
            MetadataRecord::Inactive { redirects } => match redirects.into_iter().next() {
                Some(next) => current = next,
                None => {
                    return Err(EngineError::IdentifierUnresolved {
                        input: input.to_string(),
                        chain: visited,
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeSource {
        records: HashMap<String, MetadataRecord>,
        calls: RefCell<Vec<String>>,
    }

    impl EnsembleSource for FakeSource {
        fn metadata_lookup(&self, id: &str) -> Result<MetadataRecord, EngineError> {
            self.calls.borrow_mut().push(id.to_string());
            self.records
                .get(id)
                .cloned()
                .ok_or_else(|| EngineError::collaborator(
                    format!("unknown id {id}"),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no record"),
                ))
        }

        fn structure_downloader(&self, _structure_id: &str) -> Result<Option<PathBuf>, EngineError> {
            Ok(None)
        }

        fn structure_parser(&self, _file_path: &Path) -> Result<ParsedStructure, EngineError> {
            unimplemented!("not exercised by these tests")
        }

        fn coord_cache_dir(&self) -> &Path {
            Path::new(".")
        }
    }

    /// Scenario S5: `metadata_lookup("OLD")` redirects to `"NEW"`,
    /// which is active.
    #[test]
    fn scenario_s5_identifier_redirect() {
        let mut records = HashMap::new();
        records.insert(
            "OLD".to_string(),
            MetadataRecord::Inactive {
                redirects: vec!["NEW".to_string()],
            },
        );
        records.insert(
            "NEW".to_string(),
            MetadataRecord::Active {
                primary_id: "NEW".to_string(),
                sequence: "ACDE".to_string(),
                cross_refs: vec![],
            },
        );
        let source = FakeSource {
            records,
            calls: RefCell::new(vec![]),
        };
        let (resolved, record) = resolve_redirects(&source, "OLD").unwrap();
        assert_eq!(resolved, "NEW");
        assert!(matches!(record, MetadataRecord::Active { .. }));
    }

    #[test]
    fn loop_is_detected() {
        let mut records = HashMap::new();
        records.insert(
            "A".to_string(),
            MetadataRecord::Inactive {
                redirects: vec!["B".to_string()],
            },
        );
        records.insert(
            "B".to_string(),
            MetadataRecord::Inactive {
                redirects: vec!["A".to_string()],
            },
        );
        let source = FakeSource {
            records,
            calls: RefCell::new(vec![]),
        };
        let err = resolve_redirects(&source, "A").unwrap_err();
        assert!(matches!(err, EngineError::IdentifierUnresolved { .. }));
    }

    #[test]
    fn dead_end_redirect_is_unresolved() {
        let mut records = HashMap::new();
        records.insert(
            "A".to_string(),
            MetadataRecord::Inactive { redirects: vec![] },
        );
        let source = FakeSource {
            records,
            calls: RefCell::new(vec![]),
        };
        let err = resolve_redirects(&source, "A").unwrap_err();
        assert!(matches!(err, EngineError::IdentifierUnresolved { .. }));
    }

    #[test]
    fn already_active_input_resolves_immediately() {
        let mut records = HashMap::new();
        records.insert(
            "A".to_string(),
            MetadataRecord::Active {
                primary_id: "A".to_string(),
                sequence: "AC".to_string(),
                cross_refs: vec![],
            },
        );
        let source = FakeSource {
            records,
            calls: RefCell::new(vec![]),
        };
        let (resolved, _) = resolve_redirects(&source, "A").unwrap();
        assert_eq!(resolved, "A");
        assert_eq!(source.calls.borrow().len(), 1);
    }
}
