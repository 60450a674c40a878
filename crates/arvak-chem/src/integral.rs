//! Orbital integrals and their canonical forms.
//!
//! One-electron integrals carry two orbital indices, two-electron integrals
//! carry four. For real orbitals the two-electron integral `(ij|kl)` in
//! Mulliken layout is invariant under the 8-element group generated by
//! `i <-> j`, `k <-> l` and `(ij) <-> (kl)`; the canonical form is the
//! lexicographically smallest member of that orbit.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize, Serializer};

/// Index layout of a two-electron integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegralConvention {
    /// Chemists' notation `(ij|kl)`.
    Mulliken,
    /// Physicists' notation `<ij|kl>`, equal to Mulliken `(ik|jl)`.
    Dirac,
}

/// A zero-based orbital integral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalIntegral {
    pub indices: Vec<usize>,
    pub coefficient: f64,
    pub convention: IntegralConvention,
}

impl OrbitalIntegral {
    pub fn new(indices: Vec<usize>, coefficient: f64, convention: IntegralConvention) -> Self {
        Self {
            indices,
            coefficient,
            convention,
        }
    }

    /// Relabel the indices into another convention.
    ///
    /// Mulliken and Dirac differ by exchanging the two middle indices, so the
    /// map is its own inverse. One-electron integrals are unaffected.
    pub fn to_convention(&self, target: IntegralConvention) -> Self {
        let indices = match self.indices.as_slice() {
            &[p, q, r, s] if self.convention != target => vec![p, r, q, s],
            other => other.to_vec(),
        };
        Self::new(indices, self.coefficient, target)
    }

    /// All index tuples equivalent to this integral, in Mulliken layout.
    pub fn symmetries(&self) -> Vec<Vec<usize>> {
        let mulliken = self.to_convention(IntegralConvention::Mulliken);
        match *mulliken.indices.as_slice() {
            [i, j] => vec![vec![i, j], vec![j, i]],
            [i, j, k, l] => vec![
                vec![i, j, k, l],
                vec![j, i, k, l],
                vec![i, j, l, k],
                vec![j, i, l, k],
                vec![k, l, i, j],
                vec![l, k, i, j],
                vec![k, l, j, i],
                vec![l, k, j, i],
            ],
            _ => vec![mulliken.indices.clone()],
        }
    }

    /// The unique representative of this integral's symmetry orbit, kept in
    /// the integral's own convention.
    pub fn canonical_form(&self) -> Self {
        let indices = self
            .symmetries()
            .into_iter()
            .min()
            .unwrap_or_else(|| self.indices.clone());
        Self::new(indices, self.coefficient, IntegralConvention::Mulliken)
            .to_convention(self.convention)
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical_form().indices == self.indices
    }
}

/// Integrals keyed by their index tuple, iterated in index order.
///
/// The first integral inserted for a key wins; see [`IntegralSet::insert`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegralSet {
    terms: BTreeMap<Vec<usize>, OrbitalIntegral>,
}

impl IntegralSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an integral under its own indices.
    ///
    /// Returns the already stored integral if the key was taken, in which
    /// case the set is left unchanged.
    pub fn insert(&mut self, integral: OrbitalIntegral) -> Option<&OrbitalIntegral> {
        match self.terms.entry(integral.indices.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(integral);
                None
            }
            btree_map::Entry::Occupied(slot) => Some(&*slot.into_mut()),
        }
    }

    pub fn get(&self, indices: &[usize]) -> Option<&OrbitalIntegral> {
        self.terms.get(indices)
    }

    pub fn contains(&self, indices: &[usize]) -> bool {
        self.terms.contains_key(indices)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrbitalIntegral> {
        self.terms.values()
    }
}

impl Serialize for IntegralSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.terms.values())
    }
}
