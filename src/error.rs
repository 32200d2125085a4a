//! Classified, terminal error kinds for an engine run.
//!
//! Every run ends either with a [`crate::result::EngineResult`] or one of
//! these variants: coarse run-level failures rather than parsed-file
//! diagnostics with line/column context — a run either produces a result
//! or it fails with exactly one classified reason.

use thiserror::Error;

/// The terminal error kinds an engine run can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The metadata redirect chain looped, or ended at an unknown record.
    #[error("identifier {input:?} could not be resolved (chain: {chain:?})")]
    IdentifierUnresolved {
        /// The identifier the caller originally supplied.
        input: String,
        /// The chain of redirects followed before giving up.
        chain: Vec<String>,
    },

    /// No cross-references survived the method filter and exclusion list.
    #[error("no structures remain for {reference_id:?} after filtering")]
    NoStructures {
        /// The resolved reference identifier.
        reference_id: String,
    },

    /// After parsing and classification, fewer than two usable chains remain.
    #[error("only {accepted} chain(s) survived classification, need at least 2")]
    TooFewAcceptedStructures {
        /// The number of chains that survived classification.
        accepted: usize,
    },

    /// A structure's coordinate table could not be reconciled with the RCT
    /// schema (too few or too many coordinate rows, even after head/tail
    /// padding and truncation).
    #[error("residue count mismatch for structure {structure_id:?}: expected {expected}, got {actual}")]
    ResidueCountMismatch {
        /// The structure whose coordinate table did not match.
        structure_id: String,
        /// The row count the RCT expected.
        expected: usize,
        /// The row count actually produced.
        actual: usize,
    },

    /// After trimming, `N < 2` or `K < 3`.
    #[error("insufficient alignment after trimming: N={rows}, K={chains}")]
    InsufficientAlignment {
        /// Row count (`N`) after trimming.
        rows: usize,
        /// Chain count (`K`).
        chains: usize,
    },

    /// All pair scores were non-finite; no UMF could be computed.
    #[error("no finite pair scores were produced")]
    NoValidScores,

    /// A collaborator (downloader/parser/metadata lookup) reported an
    /// unrecoverable error.
    #[error("collaborator failure: {message}")]
    CollaboratorFailure {
        /// A human-readable description of the failure.
        message: String,
        /// The underlying cause, if the collaborator produced one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl EngineError {
    /// Wrap an arbitrary collaborator error as a [`EngineError::CollaboratorFailure`].
    pub fn collaborator(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CollaboratorFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        let err = EngineError::TooFewAcceptedStructures { accepted: 1 };
        assert_eq!(
            err.to_string(),
            "only 1 chain(s) survived classification, need at least 2"
        );
    }

    #[test]
    fn collaborator_failure_preserves_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = EngineError::collaborator("download failed", io_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
