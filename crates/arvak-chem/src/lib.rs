//! Arvak electronic-structure problem loading.
//!
//! This crate turns a Broombridge problem document into a [`TypedProblem`]
//! that Hamiltonian-construction code can consume directly:
//!
//! - **Integrals**: one-based indices shifted to zero-based; one-electron
//!   integrals deduplicated by canonical form, two-electron integrals kept as
//!   written in Mulliken layout
//! - **Initial states**: operator tokens such as `(2a)+` decoded into
//!   fermionic ladder operators on flattened spin-orbital indices
//! - **Index conventions**: interleaved (`UpDown`) or blocked (`HalfUp`)
//!   spin-orbital numbering, threaded through every decoded operator
//!
//! # Example
//!
//! ```ignore
//! use arvak_chem::{BroombridgeDocument, IndexScheme};
//!
//! let document = BroombridgeDocument::from_path("h2.yaml")?;
//! for problem in document.extract_all(IndexScheme::UpDown)? {
//!     println!("{} orbitals, {} one-body terms", problem.n_orbitals, problem.one_body_terms.len());
//!     for (label, state) in &problem.initial_states {
//!         println!("{label}: {:?}", state.state_type);
//!     }
//! }
//! ```

pub mod document;
pub mod error;
pub mod fermion;
pub mod integral;
pub mod problem;
pub mod spin;
pub mod state;
pub mod terms;
pub mod token;
pub mod version;

// Re-exports
pub use document::{
    BroombridgeDocument, IntegralEntry, Quantity, RawClusterOperator, RawHamiltonian,
    RawInitialState, RawIntegralTable, RawProblem,
};
pub use error::{ChemError, ChemResult};
pub use fermion::{FermionTerm, LadderKind, LadderOperator};
pub use integral::{IntegralConvention, IntegralSet, OrbitalIntegral};
pub use problem::{extract, TypedProblem};
pub use spin::{IndexConvention, IndexScheme, Spin, SpinOrbital, UP_DOWN_MAX_ORBITALS};
pub use state::{parse_state, InputState, StateType};
pub use terms::{parse_amplitude, parse_cluster_amplitude, parse_configuration, AmplitudeTerm};
pub use token::{decode_operator, encode_operator, scan_operator};
pub use version::{resolve_version, SchemaVersion};
