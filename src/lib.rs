#![doc = include_str!("../README.md")]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions,
    clippy::too_many_lines
)]

//! See the crate-level README above for the pipeline overview. Each module
//! below corresponds to exactly one of the nine components the design
//! decomposes the engine into.

pub mod aggregate;
pub mod aligner;
pub mod assembler;
pub mod chain;
pub mod cis;
pub mod classifier;
pub mod collaborators;
pub mod config;
pub mod csv;
pub mod distance;
pub mod engine;
pub mod error;
pub mod rct;
pub mod residue;
pub mod result;
pub mod scoring;

pub use collaborators::{CrossRef, EnsembleSource, MetadataRecord, ParsedStructure};
pub use config::{Ddof, EngineConfig, MethodFilter};
pub use engine::run;
pub use error::{EngineError, Result};
pub use result::EngineResult;
