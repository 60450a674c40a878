//! Initial-state suggestions.

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::RawInitialState;
use crate::error::{ChemError, ChemResult};
use crate::spin::IndexConvention;
use crate::terms::{parse_cluster_amplitude, parse_configuration, AmplitudeTerm};

/// Method label of a single-determinant state.
pub const SINGLE_CONFIGURATIONAL: &str = "single_configurational";
/// Method label of a sparse superposition of determinants.
pub const SPARSE_MULTI_CONFIGURATIONAL: &str = "sparse_multi_configurational";
/// Method label of a unitary coupled-cluster ansatz.
pub const UNITARY_COUPLED_CLUSTER: &str = "unitary_coupled_cluster";

/// Kind of initial state, resolved from the document's method label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StateType {
    SingleConfigurational,
    SparseMultiConfigurational,
    UnitaryCoupledCluster,
    /// Any label this crate does not know. Not an error by itself.
    Unrecognized,
}

impl StateType {
    /// Resolve a method label, ignoring ASCII case.
    pub fn from_method(method: &str) -> Self {
        if method.eq_ignore_ascii_case(SINGLE_CONFIGURATIONAL) {
            StateType::SingleConfigurational
        } else if method.eq_ignore_ascii_case(SPARSE_MULTI_CONFIGURATIONAL) {
            StateType::SparseMultiConfigurational
        } else if method.eq_ignore_ascii_case(UNITARY_COUPLED_CLUSTER) {
            StateType::UnitaryCoupledCluster
        } else {
            StateType::Unrecognized
        }
    }

    /// Whether states of this kind carry a superposition.
    pub fn has_superposition(self) -> bool {
        match self {
            StateType::SparseMultiConfigurational | StateType::UnitaryCoupledCluster => true,
            StateType::SingleConfigurational | StateType::Unrecognized => false,
        }
    }
}

/// A parsed initial state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputState {
    pub label: String,
    /// Method label as written in the document.
    pub method: String,
    pub state_type: StateType,
    /// Suggested energy, if the document gives one.
    pub energy: Option<f64>,
    superposition: Vec<AmplitudeTerm>,
}

impl InputState {
    /// The amplitude/term pairs of a multi-term state.
    ///
    /// For unitary coupled cluster states the one-body amplitudes come
    /// first, then the two-body amplitudes, and the reference state is last.
    pub fn superposition(&self) -> ChemResult<&[AmplitudeTerm]> {
        if self.state_type.has_superposition() {
            Ok(&self.superposition)
        } else {
            Err(self.unsupported())
        }
    }

    /// The reference state of a unitary coupled cluster ansatz.
    pub fn reference(&self) -> ChemResult<&AmplitudeTerm> {
        match self.state_type {
            StateType::UnitaryCoupledCluster => {
                self.superposition.last().ok_or_else(|| self.unsupported())
            }
            StateType::SingleConfigurational
            | StateType::SparseMultiConfigurational
            | StateType::Unrecognized => Err(self.unsupported()),
        }
    }

    /// Every flattened spin-orbital index the state touches.
    pub fn spin_orbital_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.superposition
            .iter()
            .flat_map(|(_, term)| term.indices())
    }

    fn unsupported(&self) -> ChemError {
        ChemError::UnsupportedStateMethod {
            label: self.label.clone(),
            method: self.method.clone(),
        }
    }
}

/// Parse one raw initial state.
///
/// Unknown method labels produce [`StateType::Unrecognized`] with no
/// superposition; asking such a state for its superposition fails later.
pub fn parse_state(raw: &RawInitialState, convention: IndexConvention) -> ChemResult<InputState> {
    let method = raw.method.clone().unwrap_or_default();
    let state_type = StateType::from_method(&method);

    let superposition = match state_type {
        StateType::SingleConfigurational => Vec::new(),
        StateType::Unrecognized => {
            warn!(label = %raw.label, method = %method, "unrecognized initial state method");
            Vec::new()
        }
        StateType::SparseMultiConfigurational => raw
            .superposition
            .iter()
            .map(|tokens| parse_configuration(tokens, convention))
            .collect::<ChemResult<Vec<_>>>()?,
        StateType::UnitaryCoupledCluster => parse_unitary_coupled_cluster(raw, convention)?,
    };

    debug!(
        label = %raw.label,
        state_type = ?state_type,
        n_terms = superposition.len(),
        "parsed initial state"
    );

    Ok(InputState {
        label: raw.label.clone(),
        method,
        state_type,
        energy: raw.energy.as_ref().map(|e| e.value),
        superposition,
    })
}

fn parse_unitary_coupled_cluster(
    raw: &RawInitialState,
    convention: IndexConvention,
) -> ChemResult<Vec<AmplitudeTerm>> {
    let cluster = raw
        .cluster_operator
        .as_ref()
        .ok_or_else(|| ChemError::MissingField {
            label: raw.label.clone(),
            field: "cluster_operator",
        })?;

    let reference = parse_configuration(&cluster.reference_state, convention)?;

    let mut terms = cluster
        .one_body_amplitudes
        .iter()
        .chain(&cluster.two_body_amplitudes)
        .map(|tokens| parse_cluster_amplitude(tokens, convention))
        .collect::<ChemResult<Vec<_>>>()?;
    terms.push(reference);
    Ok(terms)
}
