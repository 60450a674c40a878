//! Typed electronic-structure problems.

use std::collections::btree_map::{self, BTreeMap};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::document::{IntegralEntry, RawProblem};
use crate::error::{ChemError, ChemResult};
use crate::integral::{IntegralConvention, IntegralSet, OrbitalIntegral};
use crate::spin::IndexConvention;
use crate::state::{parse_state, InputState};

/// A problem ready for Hamiltonian construction.
///
/// All orbital indices are zero-based. One-body integrals are stored in
/// canonical form, one per symmetry orbit. Two-body integrals are stored as
/// written (relabelled to Mulliken layout), so two entries related by
/// symmetry are both kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedProblem {
    pub n_orbitals: usize,
    pub n_electrons: usize,
    /// Coulomb repulsion plus energy offset.
    pub identity_term: f64,
    pub one_body_terms: IntegralSet,
    pub two_body_terms: IntegralSet,
    pub initial_states: BTreeMap<String, InputState>,
    pub index_convention: IndexConvention,
}

impl TypedProblem {
    pub fn num_spin_orbitals(&self) -> usize {
        self.n_orbitals.saturating_mul(2)
    }

    pub fn state(&self, label: &str) -> Option<&InputState> {
        self.initial_states.get(label)
    }
}

/// Build a [`TypedProblem`] from a raw problem description.
pub fn extract(raw: &RawProblem, convention: IndexConvention) -> ChemResult<TypedProblem> {
    let n_orbitals = raw.n_orbitals;

    let one_body_terms = raw
        .hamiltonian
        .one_electron_integrals
        .values
        .iter()
        .try_fold(IntegralSet::new(), |mut set, entry| {
            let integral = zero_based(entry, 2, n_orbitals, IntegralConvention::Mulliken)?
                .canonical_form();
            let coefficient = integral.coefficient;
            if let Some(kept) = set.insert(integral) {
                if kept.coefficient != coefficient {
                    warn!(
                        indices = ?kept.indices,
                        kept = kept.coefficient,
                        ignored = coefficient,
                        "conflicting one-electron integrals share a canonical form"
                    );
                }
            }
            Ok::<_, ChemError>(set)
        })?;

    let two_electron = &raw.hamiltonian.two_electron_integrals;
    let declared = two_electron.convention()?;
    let two_body_terms = two_electron
        .values
        .iter()
        .try_fold(IntegralSet::new(), |mut set, entry| {
            let integral = zero_based(entry, 4, n_orbitals, declared)?
                .to_convention(IntegralConvention::Mulliken);
            trace!(indices = ?integral.indices, value = integral.coefficient, "two-electron integral");
            let coefficient = integral.coefficient;
            if let Some(kept) = set.insert(integral) {
                if kept.coefficient != coefficient {
                    warn!(
                        indices = ?kept.indices,
                        kept = kept.coefficient,
                        ignored = coefficient,
                        "conflicting two-electron integrals share an index tuple"
                    );
                }
            }
            Ok::<_, ChemError>(set)
        })?;

    // No flattened index can reach a limit past usize::MAX.
    let limit = n_orbitals.checked_mul(2);
    let mut initial_states = BTreeMap::new();
    for raw_state in &raw.initial_states {
        let slot = match initial_states.entry(raw_state.label.clone()) {
            btree_map::Entry::Occupied(_) => {
                return Err(ChemError::DuplicateLabel(raw_state.label.clone()));
            }
            btree_map::Entry::Vacant(slot) => slot,
        };

        let state = parse_state(raw_state, convention)?;
        let out_of_range = limit.and_then(|limit| {
            state
                .spin_orbital_indices()
                .find(|&i| i >= limit)
                .map(|index| (index, limit))
        });
        if let Some((index, limit)) = out_of_range {
            return Err(ChemError::SpinOrbitalOutOfRange {
                label: state.label,
                index,
                limit,
            });
        }
        slot.insert(state);
    }

    debug!(
        n_orbitals,
        n_electrons = raw.n_electrons,
        n_one_body = one_body_terms.len(),
        n_two_body = two_body_terms.len(),
        n_states = initial_states.len(),
        "extracted problem"
    );

    Ok(TypedProblem {
        n_orbitals,
        n_electrons: raw.n_electrons,
        identity_term: raw.coulomb_repulsion.value + raw.energy_offset.value,
        one_body_terms,
        two_body_terms,
        initial_states,
        index_convention: convention,
    })
}

/// Check the arity and range of a one-based entry and shift it to zero-based.
fn zero_based(
    entry: &IntegralEntry,
    arity: usize,
    n_orbitals: usize,
    convention: IntegralConvention,
) -> ChemResult<OrbitalIntegral> {
    if entry.indices.len() != arity {
        return Err(ChemError::IntegralArity {
            indices: entry.indices.clone(),
            expected: arity,
            found: entry.indices.len(),
        });
    }
    let indices = entry
        .indices
        .iter()
        .map(|&index| {
            if (1..=n_orbitals).contains(&index) {
                Ok(index - 1)
            } else {
                Err(ChemError::OrbitalIndexOutOfRange { index, n_orbitals })
            }
        })
        .collect::<ChemResult<Vec<_>>>()?;
    Ok(OrbitalIntegral::new(indices, entry.value, convention))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Quantity, RawClusterOperator, RawHamiltonian, RawInitialState, RawIntegralTable};
    use crate::state::{StateType, SPARSE_MULTI_CONFIGURATIONAL, UNITARY_COUPLED_CLUSTER};
    use num_complex::Complex64;
    use proptest::prelude::*;
    use std::collections::{BTreeSet, HashSet};

    const UP_DOWN: IndexConvention = IndexConvention::UpDown;

    fn entry(indices: &[usize], value: f64) -> IntegralEntry {
        IntegralEntry::new(indices.to_vec(), value)
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn problem(one: Vec<IntegralEntry>, two: Vec<IntegralEntry>) -> RawProblem {
        RawProblem {
            n_orbitals: 4,
            n_electrons: 2,
            coulomb_repulsion: Quantity::new(0.75),
            energy_offset: Quantity::new(-0.25),
            hamiltonian: RawHamiltonian {
                one_electron_integrals: RawIntegralTable::new(one),
                two_electron_integrals: RawIntegralTable::new(two),
            },
            initial_states: Vec::new(),
        }
    }

    fn sparse_state(label: &str, configurations: &[&[&str]]) -> RawInitialState {
        RawInitialState {
            label: label.to_string(),
            method: Some(SPARSE_MULTI_CONFIGURATIONAL.to_string()),
            superposition: configurations.iter().map(|c| tokens(c)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scalar_fields() {
        let typed = extract(&problem(vec![], vec![]), UP_DOWN).unwrap();
        assert_eq!(typed.n_orbitals, 4);
        assert_eq!(typed.n_electrons, 2);
        assert_eq!(typed.num_spin_orbitals(), 8);
        assert_eq!(typed.identity_term, 0.5);
        assert_eq!(typed.index_convention, UP_DOWN);
        assert!(typed.one_body_terms.is_empty());
        assert!(typed.initial_states.is_empty());
    }

    #[test]
    fn test_one_body_terms_are_canonical_and_deduplicated() {
        let raw = problem(
            vec![entry(&[1, 1], -1.0), entry(&[1, 2], 0.5), entry(&[2, 1], 0.5)],
            vec![],
        );
        let typed = extract(&raw, UP_DOWN).unwrap();
        assert_eq!(typed.one_body_terms.len(), 2);
        assert!(typed.one_body_terms.contains(&[0, 0]));
        assert!(typed.one_body_terms.contains(&[0, 1]));
        assert!(!typed.one_body_terms.contains(&[1, 0]));
    }

    #[test]
    fn test_conflicting_one_body_entries_keep_first() {
        let raw = problem(vec![entry(&[2, 1], 0.5), entry(&[1, 2], 0.7)], vec![]);
        let typed = extract(&raw, UP_DOWN).unwrap();
        assert_eq!(typed.one_body_terms.get(&[0, 1]).map(|i| i.coefficient), Some(0.5));
    }

    #[test]
    fn test_two_body_terms_are_not_canonicalized() {
        // (12|12) and (21|21) share a canonical form but both survive.
        let raw = problem(
            vec![],
            vec![
                entry(&[1, 2, 1, 2], 0.3),
                entry(&[2, 1, 2, 1], 0.3),
                entry(&[1, 2, 1, 2], 0.3),
            ],
        );
        let typed = extract(&raw, UP_DOWN).unwrap();
        assert_eq!(typed.two_body_terms.len(), 2);
        assert!(typed.two_body_terms.contains(&[0, 1, 0, 1]));
        assert!(typed.two_body_terms.contains(&[1, 0, 1, 0]));
        assert!(typed
            .two_body_terms
            .iter()
            .all(|i| i.convention == IntegralConvention::Mulliken));
    }

    #[test]
    fn test_dirac_two_body_table_is_relabelled() {
        let mut raw = problem(vec![], vec![entry(&[1, 2, 3, 4], 0.1)]);
        raw.hamiltonian.two_electron_integrals.index_convention = Some("dirac".to_string());
        let typed = extract(&raw, UP_DOWN).unwrap();
        assert!(typed.two_body_terms.contains(&[0, 2, 1, 3]));
    }

    #[test]
    fn test_index_range_is_checked() {
        for bad in [0, 5] {
            let raw = problem(vec![entry(&[1, bad], 0.1)], vec![]);
            assert!(matches!(
                extract(&raw, UP_DOWN),
                Err(ChemError::OrbitalIndexOutOfRange { index, n_orbitals: 4 }) if index == bad
            ));
        }
    }

    #[test]
    fn test_integral_arity_is_checked() {
        let raw = problem(vec![entry(&[1, 2, 3], 0.1)], vec![]);
        assert!(matches!(
            extract(&raw, UP_DOWN),
            Err(ChemError::IntegralArity { expected: 2, found: 3, .. })
        ));
        let raw = problem(vec![], vec![entry(&[1, 2], 0.1)]);
        assert!(matches!(
            extract(&raw, UP_DOWN),
            Err(ChemError::IntegralArity { expected: 4, found: 2, .. })
        ));
    }

    #[test]
    fn test_initial_states_by_label() {
        let mut raw = problem(vec![], vec![]);
        raw.initial_states = vec![
            sparse_state("|G>", &[&["0.5", "(1a)+", "(2a)+", "marker"]]),
            RawInitialState {
                label: "UCC".to_string(),
                method: Some(UNITARY_COUPLED_CLUSTER.to_string()),
                cluster_operator: Some(RawClusterOperator {
                    reference_state: tokens(&["1.0", "(1a)+", "(2a)+", "|vacuum>"]),
                    one_body_amplitudes: vec![tokens(&["0.1", "(1a)+", "(3a)+"])],
                    two_body_amplitudes: vec![],
                }),
                ..Default::default()
            },
        ];

        let typed = extract(&raw, UP_DOWN).unwrap();
        assert_eq!(typed.initial_states.len(), 2);

        let ground = typed.state("|G>").unwrap();
        let sup = ground.superposition().unwrap();
        assert_eq!(sup.len(), 1);
        assert_eq!(sup[0].0, Complex64::new(0.5, 0.0));
        assert_eq!(sup[0].1.coefficient, 1.0);

        let ucc = typed.state("UCC").unwrap();
        assert_eq!(ucc.state_type, StateType::UnitaryCoupledCluster);
        let sup = ucc.superposition().unwrap();
        assert_eq!(sup.len(), 2);
        assert_eq!(ucc.reference().unwrap(), &sup[1]);
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let mut raw = problem(vec![], vec![]);
        raw.initial_states = vec![
            sparse_state("|G>", &[&["0.5", "(1a)+", "|vacuum>"]]),
            sparse_state("|G>", &[&["0.5", "(2a)+", "|vacuum>"]]),
        ];
        assert!(matches!(
            extract(&raw, UP_DOWN),
            Err(ChemError::DuplicateLabel(label)) if label == "|G>"
        ));
    }

    #[test]
    fn test_spin_orbital_range_is_checked() {
        let mut raw = problem(vec![], vec![]);
        raw.n_orbitals = 2;
        raw.initial_states = vec![sparse_state("|X>", &[&["1.0", "(3a)+", "|vacuum>"]])];
        assert!(matches!(
            extract(&raw, UP_DOWN),
            Err(ChemError::SpinOrbitalOutOfRange { index: 4, limit: 4, .. })
        ));
    }

    #[test]
    fn test_conflicting_two_body_entries_keep_first() {
        let raw = problem(
            vec![],
            vec![entry(&[1, 2, 1, 2], 0.3), entry(&[1, 2, 1, 2], 0.4)],
        );
        let typed = extract(&raw, UP_DOWN).unwrap();
        assert_eq!(typed.two_body_terms.len(), 1);
        assert_eq!(
            typed.two_body_terms.get(&[0, 1, 0, 1]).map(|i| i.coefficient),
            Some(0.3)
        );
    }

    #[test]
    fn test_oversized_orbital_token_is_rejected() {
        let mut raw = problem(vec![], vec![]);
        raw.n_orbitals = 2;
        raw.initial_states = vec![sparse_state(
            "|X>",
            &[&["1.0", "(9223372036854775809a)+", "|vacuum>"]],
        )];
        for convention in [UP_DOWN, IndexConvention::HalfUp { n_orbitals: 2 }] {
            assert!(matches!(
                extract(&raw, convention),
                Err(ChemError::OrbitalOutOfRange { orbital: 9_223_372_036_854_775_808, .. })
            ));
        }
    }

    #[test]
    fn test_huge_orbital_count_does_not_overflow() {
        let mut raw = problem(vec![], vec![]);
        raw.n_orbitals = usize::MAX;
        raw.initial_states = vec![sparse_state("|G>", &[&["1.0", "(1a)+", "(1b)+", "|vacuum>"]])];

        let typed = extract(&raw, UP_DOWN).unwrap();
        assert_eq!(typed.num_spin_orbitals(), usize::MAX);
        let sup = typed.state("|G>").unwrap().superposition().unwrap();
        assert_eq!(sup[0].1.indices().collect::<Vec<_>>(), vec![0, 1]);

        let typed = extract(&raw, IndexConvention::HalfUp { n_orbitals: usize::MAX }).unwrap();
        let sup = typed.state("|G>").unwrap().superposition().unwrap();
        assert_eq!(sup[0].1.indices().collect::<Vec<_>>(), vec![0, usize::MAX]);
    }

    #[test]
    fn test_half_up_convention_is_threaded_through() {
        let mut raw = problem(vec![], vec![]);
        raw.initial_states = vec![sparse_state("|G>", &[&["1.0", "(1a)+", "(1b)+", "|vacuum>"]])];
        let typed = extract(&raw, IndexConvention::HalfUp { n_orbitals: 4 }).unwrap();
        let sup = typed.state("|G>").unwrap().superposition().unwrap();
        assert_eq!(sup[0].1.indices().collect::<Vec<_>>(), vec![0, 4]);
    }

    #[test]
    fn test_unrecognized_state_is_stored() {
        let mut raw = problem(vec![], vec![]);
        raw.initial_states = vec![RawInitialState {
            label: "?".to_string(),
            method: Some("mystery".to_string()),
            ..Default::default()
        }];
        let typed = extract(&raw, UP_DOWN).unwrap();
        let state = typed.state("?").unwrap();
        assert_eq!(state.state_type, StateType::Unrecognized);
        assert!(matches!(
            state.superposition(),
            Err(ChemError::UnsupportedStateMethod { .. })
        ));
    }

    fn one_based_pair() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..=4, 2)
    }

    fn one_based_quad() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..=4, 4)
    }

    proptest! {
        #[test]
        fn prop_set_sizes_match_distinct_forms(
            ones in prop::collection::vec(one_based_pair(), 0..12),
            twos in prop::collection::vec(one_based_quad(), 0..12),
        ) {
            let raw = problem(
                ones.iter().map(|i| entry(i, 1.0)).collect(),
                twos.iter().map(|i| entry(i, 1.0)).collect(),
            );
            let typed = extract(&raw, UP_DOWN).unwrap();

            let canonical_pairs: BTreeSet<(usize, usize)> = ones
                .iter()
                .map(|i| (i[0].min(i[1]), i[0].max(i[1])))
                .collect();
            let raw_quads: HashSet<&Vec<usize>> = twos.iter().collect();
            let canonical_quads: HashSet<Vec<usize>> = twos
                .iter()
                .map(|i| {
                    let zero: Vec<usize> = i.iter().map(|x| x - 1).collect();
                    OrbitalIntegral::new(zero, 1.0, IntegralConvention::Mulliken)
                        .canonical_form()
                        .indices
                })
                .collect();

            prop_assert_eq!(typed.one_body_terms.len(), canonical_pairs.len());
            prop_assert_eq!(typed.two_body_terms.len(), raw_quads.len());
            prop_assert!(typed.two_body_terms.len() >= canonical_quads.len());
        }

        #[test]
        fn prop_extraction_is_deterministic(
            ones in prop::collection::vec(one_based_pair(), 0..8),
            twos in prop::collection::vec(one_based_quad(), 0..8),
        ) {
            let raw = problem(
                ones.iter().map(|i| entry(i, 0.5)).collect(),
                twos.iter().map(|i| entry(i, -0.5)).collect(),
            );
            prop_assert_eq!(extract(&raw, UP_DOWN).unwrap(), extract(&raw, UP_DOWN).unwrap());
        }
    }
}
