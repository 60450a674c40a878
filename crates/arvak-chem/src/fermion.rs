//! Fermionic ladder-operator products and their normal ordering.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Creation or annihilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LadderKind {
    Creation,
    Annihilation,
}

impl LadderKind {
    /// `1` for creation, `0` for annihilation.
    pub fn flag(self) -> u8 {
        match self {
            LadderKind::Creation => 1,
            LadderKind::Annihilation => 0,
        }
    }
}

/// A single ladder operator acting on a flattened spin-orbital index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LadderOperator {
    pub kind: LadderKind,
    pub index: usize,
}

impl LadderOperator {
    pub fn creation(index: usize) -> Self {
        Self {
            kind: LadderKind::Creation,
            index,
        }
    }

    pub fn annihilation(index: usize) -> Self {
        Self {
            kind: LadderKind::Annihilation,
            index,
        }
    }
}

impl fmt::Display for LadderOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LadderKind::Creation => write!(f, "a†{}", self.index),
            LadderKind::Annihilation => write!(f, "a{}", self.index),
        }
    }
}

/// How an adjacent operator pair violates normal order.
enum Disorder {
    /// Two identical creation (or annihilation) operators: the product is zero.
    Repeated,
    /// Anticommute with a sign flip.
    Swap,
    /// `a_i a†_i = 1 - a†_i a_i`.
    Contract,
}

/// An ordered product of ladder operators with a scalar coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FermionTerm {
    pub operators: Vec<LadderOperator>,
    pub coefficient: f64,
}

impl FermionTerm {
    pub fn new(operators: Vec<LadderOperator>, coefficient: f64) -> Self {
        Self {
            operators,
            coefficient,
        }
    }

    /// Number of ladder operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// The same operator product with another coefficient.
    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }

    /// True if every operator is a creation operator, i.e. the term applied to
    /// the vacuum creates a state.
    pub fn is_created_state(&self) -> bool {
        self.operators
            .iter()
            .all(|op| op.kind == LadderKind::Creation)
    }

    /// Flattened spin-orbital indices in operator order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.operators.iter().map(|op| op.index)
    }

    /// True if the term is already in normal order with no repeated operator.
    pub fn is_canonical(&self) -> bool {
        self.first_disorder().is_none()
    }

    fn first_disorder(&self) -> Option<(usize, Disorder)> {
        self.operators.windows(2).enumerate().find_map(|(k, pair)| {
            let (x, y) = (pair[0], pair[1]);
            let disorder = match (x.kind, y.kind) {
                (LadderKind::Creation, LadderKind::Annihilation) => None,
                (LadderKind::Annihilation, LadderKind::Creation) if x.index == y.index => {
                    Some(Disorder::Contract)
                }
                (LadderKind::Annihilation, LadderKind::Creation) => Some(Disorder::Swap),
                (LadderKind::Creation, LadderKind::Creation) if x.index == y.index => {
                    Some(Disorder::Repeated)
                }
                (LadderKind::Creation, LadderKind::Creation) if x.index > y.index => {
                    Some(Disorder::Swap)
                }
                (LadderKind::Annihilation, LadderKind::Annihilation) if x.index == y.index => {
                    Some(Disorder::Repeated)
                }
                (LadderKind::Annihilation, LadderKind::Annihilation) if x.index < y.index => {
                    Some(Disorder::Swap)
                }
                _ => None,
            };
            disorder.map(|d| (k, d))
        })
    }

    /// Swap operators `k` and `k + 1`, flipping the sign.
    fn swapped(&self, k: usize) -> Self {
        let mut operators = self.operators.clone();
        operators.swap(k, k + 1);
        Self::new(operators, -self.coefficient)
    }

    /// Drop operators `k` and `k + 1`.
    fn contracted(&self, k: usize) -> Self {
        let mut operators = self.operators.clone();
        operators.drain(k..=k + 1);
        Self::new(operators, self.coefficient)
    }

    /// Bring the term into normal order using the anticommutation relations.
    ///
    /// Creation operators end up left of annihilation operators, creation
    /// indices ascending and annihilation indices descending. The result may
    /// be empty (the product vanishes) or hold several terms (contractions
    /// produced lower-order terms). Identical operator products are merged in
    /// order of first appearance and exact zeros dropped.
    pub fn canonical_order(&self) -> Vec<FermionTerm> {
        let mut pending = vec![self.clone()];
        let mut ordered = Vec::new();

        while let Some(term) = pending.pop() {
            match term.first_disorder() {
                None => ordered.push(term),
                Some((_, Disorder::Repeated)) => {}
                Some((k, Disorder::Swap)) => pending.push(term.swapped(k)),
                Some((k, Disorder::Contract)) => {
                    pending.push(term.contracted(k));
                    pending.push(term.swapped(k));
                }
            }
        }

        merge_like_terms(ordered)
    }
}

impl fmt::Display for FermionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coefficient)?;
        for op in &self.operators {
            write!(f, " {}", op)?;
        }
        Ok(())
    }
}

fn merge_like_terms(terms: Vec<FermionTerm>) -> Vec<FermionTerm> {
    let mut position: FxHashMap<Vec<LadderOperator>, usize> = FxHashMap::default();
    let mut merged: Vec<FermionTerm> = Vec::with_capacity(terms.len());

    for term in terms {
        match position.get(&term.operators) {
            Some(&i) => merged[i].coefficient += term.coefficient,
            None => {
                position.insert(term.operators.clone(), merged.len());
                merged.push(term);
            }
        }
    }

    merged.retain(|t| t.coefficient != 0.0);
    merged
}
