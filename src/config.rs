//! Tunable parameters for an engine run.
//!
//! A flat struct of documented, defaulted fields. The engine never reads
//! these from a file itself — a driver may deserialize `EngineConfig` from
//! TOML/JSON and pass it in, but that I/O stays outside the core.

use serde::{Deserialize, Serialize};

/// Experimental method used to restrict which chains are eligible.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum MethodFilter {
    /// X-ray crystallography structures only.
    #[default]
    Xray,
    /// Solution NMR structures only.
    NMR,
    /// Electron microscopy structures only.
    EM,
    /// No restriction on experimental method.
    Any,
}

impl MethodFilter {
    /// Whether a structure tagged with `method` passes this filter.
    #[must_use]
    pub fn accepts(self, method: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Xray => method.eq_ignore_ascii_case("x-ray"),
            Self::NMR => method.eq_ignore_ascii_case("nmr"),
            Self::EM => method.eq_ignore_ascii_case("em"),
        }
    }
}

/// Which denominator the DSA scorer (component F) and pair statistics
/// (component G) use for standard deviation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Ddof {
    /// Denominator `n` (population standard deviation). The paper-mode
    /// default.
    #[default]
    Population,
    /// Denominator `n - 1` (sample standard deviation).
    Sample,
}

impl Ddof {
    /// The delta-degrees-of-freedom subtracted from `n`.
    #[must_use]
    pub const fn delta(self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }
}

/// Parameters governing a single engine run.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of candidate structures to consider.
    ///
    /// Default: 20.
    pub max_structures: usize,
    /// Minimum fraction of chains that must have a non-missing residue at a
    /// slot for that slot to survive trimming (component C).
    ///
    /// Default: 0.9.
    pub seq_ratio: f64,
    /// Distance threshold (Å) used by the cis detector (component H).
    ///
    /// Default: 3.8.
    pub cis_threshold: f64,
    /// Experimental method restriction.
    ///
    /// Default: [`MethodFilter::Xray`].
    pub method_filter: MethodFilter,
    /// Standard deviation denominator used by the DSA scorer.
    ///
    /// Default: [`Ddof::Population`].
    pub ddof: Ddof,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_structures: 20,
            seq_ratio: 0.9,
            cis_threshold: 3.8,
            method_filter: MethodFilter::Xray,
            ddof: Ddof::Population,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_structures, 20);
        assert!((cfg.seq_ratio - 0.9).abs() < f64::EPSILON);
        assert!((cfg.cis_threshold - 3.8).abs() < f64::EPSILON);
        assert_eq!(cfg.method_filter, MethodFilter::Xray);
        assert_eq!(cfg.ddof, Ddof::Population);
    }

    #[test]
    fn method_filter_accepts() {
        assert!(MethodFilter::Xray.accepts("X-ray"));
        assert!(!MethodFilter::Xray.accepts("NMR"));
        assert!(MethodFilter::Any.accepts("anything"));
    }

    #[test]
    fn ddof_delta() {
        assert_eq!(Ddof::Population.delta(), 0);
        assert_eq!(Ddof::Sample.delta(), 1);
    }
}
