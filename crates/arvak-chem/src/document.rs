//! Broombridge YAML documents.
//!
//! Only the fields needed to build a [`TypedProblem`] are read; everything
//! else in the document (geometry, basis set, bibliography, ...) is ignored.
//!
//! ```yaml
//! format:
//!   version: '0.2'
//! problem_description:
//!   - n_orbitals: 2
//!     n_electrons: 2
//!     coulomb_repulsion: {value: 0.713, units: hartree}
//!     energy_offset: {value: 0.0, units: hartree}
//!     hamiltonian:
//!       one_electron_integrals:
//!         values:
//!           - [1, 1, -1.25]
//!       two_electron_integrals:
//!         index_convention: mulliken
//!         values:
//!           - [1, 1, 1, 1, 0.67]
//!     initial_state_suggestions:
//!       - state:
//!           label: '|G>'
//!           method: sparse_multi_configurational
//!           superposition:
//!             - [1.0, '(1a)+', '(1b)+', '|vacuum>']
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ChemError, ChemResult};
use crate::integral::IntegralConvention;
use crate::problem::{extract, TypedProblem};
use crate::spin::IndexScheme;
use crate::state::SPARSE_MULTI_CONFIGURATIONAL;
use crate::version::{resolve_version, SchemaVersion};

/// A complete problem document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BroombridgeDocument {
    pub format: RawFormat,
    pub problem_description: Vec<RawProblem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFormat {
    pub version: String,
}

/// A value with optional units.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(default)]
    pub units: Option<String>,
}

impl Quantity {
    pub fn new(value: f64) -> Self {
        Self { value, units: None }
    }
}

/// One electronic-structure problem as written in the document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawProblem {
    pub n_orbitals: usize,
    pub n_electrons: usize,
    pub coulomb_repulsion: Quantity,
    #[serde(default)]
    pub energy_offset: Quantity,
    pub hamiltonian: RawHamiltonian,
    #[serde(
        rename = "initial_state_suggestions",
        default,
        deserialize_with = "state_suggestions"
    )]
    pub initial_states: Vec<RawInitialState>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawHamiltonian {
    pub one_electron_integrals: RawIntegralTable,
    pub two_electron_integrals: RawIntegralTable,
}

/// A sparse integral table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawIntegralTable {
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub index_convention: Option<String>,
    #[serde(default)]
    pub values: Vec<IntegralEntry>,
}

impl RawIntegralTable {
    pub fn new(values: Vec<IntegralEntry>) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    /// Declared index convention; Mulliken when absent.
    pub fn convention(&self) -> ChemResult<IntegralConvention> {
        match self.index_convention.as_deref() {
            None => Ok(IntegralConvention::Mulliken),
            Some(c) if c.eq_ignore_ascii_case("mulliken") => Ok(IntegralConvention::Mulliken),
            Some(c) if c.eq_ignore_ascii_case("dirac") => Ok(IntegralConvention::Dirac),
            Some(other) => Err(ChemError::UnsupportedIntegralConvention(other.to_string())),
        }
    }
}

/// One sparse integral: one-based orbital indices followed by the value,
/// written as a flat YAML sequence such as `[1, 2, -0.5]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct IntegralEntry {
    pub indices: Vec<usize>,
    pub value: f64,
}

impl IntegralEntry {
    pub fn new(indices: Vec<usize>, value: f64) -> Self {
        Self { indices, value }
    }
}

impl TryFrom<Vec<f64>> for IntegralEntry {
    type Error = String;

    fn try_from(row: Vec<f64>) -> Result<Self, Self::Error> {
        let (&value, indices) = row
            .split_last()
            .ok_or_else(|| "empty integral entry".to_string())?;
        let indices = indices
            .iter()
            .map(|&i| {
                if i >= 0.0 && i.fract() == 0.0 && i <= u32::MAX as f64 {
                    Ok(i as usize)
                } else {
                    Err(format!("integral index {i} is not a non-negative integer"))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { indices, value })
    }
}

/// A suggested initial state.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawInitialState {
    pub label: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub energy: Option<Quantity>,
    #[serde(default, deserialize_with = "token_lists")]
    pub superposition: Vec<Vec<String>>,
    #[serde(default)]
    pub cluster_operator: Option<RawClusterOperator>,
}

/// Unitary coupled-cluster operator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawClusterOperator {
    #[serde(deserialize_with = "tokens")]
    pub reference_state: Vec<String>,
    #[serde(default, deserialize_with = "token_lists")]
    pub one_body_amplitudes: Vec<Vec<String>>,
    #[serde(default, deserialize_with = "token_lists")]
    pub two_body_amplitudes: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct StateSuggestion {
    state: RawInitialState,
}

fn state_suggestions<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawInitialState>, D::Error> {
    Ok(Vec::<StateSuggestion>::deserialize(d)?
        .into_iter()
        .map(|s| s.state)
        .collect())
}

/// Amplitudes are usually bare YAML numbers while operators are strings.
fn scalar_text<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "expected a token string or number, found {other:?}"
        ))),
    }
}

fn tokens<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Vec::<Value>::deserialize(d)?
        .into_iter()
        .map(scalar_text)
        .collect()
}

fn token_lists<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<String>>, D::Error> {
    Vec::<Vec<Value>>::deserialize(d)?
        .into_iter()
        .map(|list| list.into_iter().map(scalar_text).collect::<Result<Vec<_>, _>>())
        .collect()
}

impl BroombridgeDocument {
    /// Parse a document from YAML text.
    ///
    /// Version 0.1 documents predate the `method` field of initial states;
    /// their states are read as sparse multi-configurational.
    pub fn from_yaml_str(text: &str) -> ChemResult<Self> {
        let mut document: Self = serde_yaml::from_str(text)?;
        let version = document.version()?;
        debug!(%version, n_problems = document.problem_description.len(), "loaded document");

        match version {
            SchemaVersion::V0_1 => document.upgrade_initial_state_methods(),
            SchemaVersion::V0_2 => {}
        }
        Ok(document)
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> ChemResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ChemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn version(&self) -> ChemResult<SchemaVersion> {
        resolve_version(&self.format.version)
    }

    /// Build a typed problem for every problem description.
    ///
    /// The index scheme is resolved per problem, so half-up indexing uses
    /// each problem's own orbital count.
    pub fn extract_all(&self, scheme: IndexScheme) -> ChemResult<Vec<TypedProblem>> {
        self.problem_description
            .iter()
            .map(|problem| extract(problem, scheme.convention_for(problem.n_orbitals)))
            .collect()
    }

    fn upgrade_initial_state_methods(&mut self) {
        for state in self
            .problem_description
            .iter_mut()
            .flat_map(|p| p.initial_states.iter_mut())
        {
            state
                .method
                .get_or_insert_with(|| SPARSE_MULTI_CONFIGURATIONAL.to_string());
        }
    }
}
