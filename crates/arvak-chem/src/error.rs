//! Error types for problem loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for chemistry loading operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors raised while decoding a problem document into its typed form.
///
/// Every variant carries the raw value that caused it.
#[derive(Error, Debug)]
pub enum ChemError {
    /// The document declares a schema version that is not supported.
    #[error("invalid schema version: '{0}'")]
    InvalidVersion(String),

    /// An operator token did not contain a `(<digits><a|b>)` core.
    #[error("malformed operator token: '{0}'")]
    MalformedOperatorToken(String),

    /// An amplitude token is not a finite decimal number.
    #[error("invalid amplitude '{0}': expected a finite decimal number")]
    NumberFormat(String),

    /// A token list is too short to hold an amplitude (and trailing marker).
    #[error("incomplete term [{}]: {reason}", .tokens.join(", "))]
    IncompleteTerm {
        tokens: Vec<String>,
        reason: &'static str,
    },

    /// An initial state lacks a field its method requires.
    #[error("initial state '{label}' is missing '{field}'")]
    MissingField { label: String, field: &'static str },

    /// Two initial states share the same label.
    #[error("duplicate initial state label: '{0}'")]
    DuplicateLabel(String),

    /// A superposition was requested from a state that does not carry one.
    #[error("initial state '{label}' with method '{method}' has no superposition")]
    UnsupportedStateMethod { label: String, method: String },

    /// A one-based orbital index is zero or larger than the orbital count.
    #[error("orbital index {index} out of range 1..={n_orbitals}")]
    OrbitalIndexOutOfRange { index: usize, n_orbitals: usize },

    /// A zero-based orbital does not fit the index convention.
    #[error("orbital {orbital} does not fit an index convention over {n_orbitals} orbitals")]
    OrbitalOutOfRange { orbital: usize, n_orbitals: usize },

    /// A flattened spin-orbital index is outside `[0, 2 * n_orbitals)`.
    #[error("initial state '{label}' references spin-orbital {index}, limit is {limit}")]
    SpinOrbitalOutOfRange {
        label: String,
        index: usize,
        limit: usize,
    },

    /// An integral entry has the wrong number of indices.
    #[error("integral entry {indices:?} has {found} indices, expected {expected}")]
    IntegralArity {
        indices: Vec<usize>,
        expected: usize,
        found: usize,
    },

    /// A two-electron table declares an unknown index convention.
    #[error("unsupported integral index convention: '{0}'")]
    UnsupportedIntegralConvention(String),

    /// The document is not valid YAML or does not match the expected shape.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
