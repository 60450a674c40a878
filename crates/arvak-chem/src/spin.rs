//! Spin-orbitals and the conventions that flatten them to integers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};

/// Electron spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Spin {
    /// Spin up, written `a` in operator tokens.
    Up,
    /// Spin down, written `b` in operator tokens.
    Down,
}

impl Spin {
    fn offset(self) -> usize {
        match self {
            Spin::Up => 0,
            Spin::Down => 1,
        }
    }

    /// Token letter for this spin.
    pub fn letter(self) -> char {
        match self {
            Spin::Up => 'a',
            Spin::Down => 'b',
        }
    }
}

/// How a `(orbital, spin)` pair is flattened to a single index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexConvention {
    /// Interleaved: `2 * orbital + spin`.
    UpDown,
    /// Blocked: all up spin-orbitals first, then all down ones.
    HalfUp { n_orbitals: usize },
}

/// Convention family, resolved to an [`IndexConvention`] once the orbital
/// count of a problem is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexScheme {
    #[default]
    UpDown,
    HalfUp,
}

impl IndexScheme {
    pub fn convention_for(self, n_orbitals: usize) -> IndexConvention {
        match self {
            IndexScheme::UpDown => IndexConvention::UpDown,
            IndexScheme::HalfUp => IndexConvention::HalfUp { n_orbitals },
        }
    }
}

/// Largest orbital count whose interleaved indices all fit in a `usize`.
pub const UP_DOWN_MAX_ORBITALS: usize = usize::MAX / 2 + 1;

/// A zero-based spatial orbital paired with a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpinOrbital {
    pub orbital: usize,
    pub spin: Spin,
}

impl SpinOrbital {
    pub fn new(orbital: usize, spin: Spin) -> Self {
        Self { orbital, spin }
    }

    /// Flatten to a single spin-orbital index.
    ///
    /// Fails with [`ChemError::OrbitalOutOfRange`] when the orbital lies
    /// outside a [`IndexConvention::HalfUp`] orbital count, since the index
    /// would alias a spin-orbital of the other spin, or when the flattened
    /// index does not fit in a `usize`.
    pub fn to_index(self, convention: IndexConvention) -> ChemResult<usize> {
        let (index, n_orbitals) = match convention {
            IndexConvention::UpDown => (
                self.orbital
                    .checked_mul(2)
                    .and_then(|i| i.checked_add(self.spin.offset())),
                UP_DOWN_MAX_ORBITALS,
            ),
            IndexConvention::HalfUp { n_orbitals } if self.orbital < n_orbitals => (
                n_orbitals
                    .checked_mul(self.spin.offset())
                    .and_then(|i| i.checked_add(self.orbital)),
                n_orbitals,
            ),
            IndexConvention::HalfUp { n_orbitals } => (None, n_orbitals),
        };
        index.ok_or(ChemError::OrbitalOutOfRange {
            orbital: self.orbital,
            n_orbitals,
        })
    }
}

impl fmt::Display for SpinOrbital {
    /// Formats in token notation, one-based: orbital 0 spin up is `1a`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.orbital + 1, self.spin.letter())
    }
}
