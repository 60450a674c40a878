//! Operator token decoding.
//!
//! A token names one ladder operator on a spin-orbital:
//!
//! ```text
//! token := junk* "(" digit+ ("a" | "b") ")" "+"* junk*
//! ```
//!
//! Digits are a one-based orbital, `a` is spin up, `b` is spin down. A `+`
//! directly after the closing parenthesis marks a creation operator (any
//! number of them means the same thing); without it the operator is an
//! annihilation. Text around the core is ignored.

use crate::error::{ChemError, ChemResult};
use crate::fermion::{LadderKind, LadderOperator};
use crate::spin::{IndexConvention, Spin, SpinOrbital};

const OPEN: u8 = b'(';
const CLOSE: u8 = b')';
const CREATION: u8 = b'+';

/// Decode a token into its ladder kind and zero-based spin-orbital.
pub fn scan_operator(token: &str) -> ChemResult<(LadderKind, SpinOrbital)> {
    let bytes = token.as_bytes();
    let malformed = || ChemError::MalformedOperatorToken(token.to_string());

    let (digits, spin, close) = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == OPEN)
        .find_map(|(open, _)| scan_core(bytes, open + 1))
        .ok_or_else(malformed)?;

    // Digits are ASCII, so slicing the str at these offsets is safe.
    let orbital = token[digits.0..digits.1]
        .parse::<usize>()
        .ok()
        .and_then(|one_based| one_based.checked_sub(1))
        .ok_or_else(malformed)?;

    let kind = if bytes.get(close + 1) == Some(&CREATION) {
        LadderKind::Creation
    } else {
        LadderKind::Annihilation
    };

    Ok((kind, SpinOrbital::new(orbital, spin)))
}

/// Match `digit+ spin ")"` at `pos`, returning the digit span, the spin and
/// the offset of the closing parenthesis.
fn scan_core(bytes: &[u8], pos: usize) -> Option<((usize, usize), Spin, usize)> {
    let rest = bytes.get(pos..)?;
    let n_digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if n_digits == 0 {
        return None;
    }
    let spin = match rest.get(n_digits)? {
        b'a' => Spin::Up,
        b'b' => Spin::Down,
        _ => return None,
    };
    let close = pos + n_digits + 1;
    (bytes.get(close) == Some(&CLOSE)).then_some(((pos, pos + n_digits), spin, close))
}

/// Decode a token into a ladder operator on a flattened spin-orbital index.
pub fn decode_operator(token: &str, convention: IndexConvention) -> ChemResult<LadderOperator> {
    let (kind, spin_orbital) = scan_operator(token)?;
    Ok(LadderOperator {
        kind,
        index: spin_orbital.to_index(convention)?,
    })
}

/// Write the token for a ladder operator on a zero-based spin-orbital.
pub fn encode_operator(kind: LadderKind, spin_orbital: SpinOrbital) -> String {
    match kind {
        LadderKind::Creation => format!("({})+", spin_orbital),
        LadderKind::Annihilation => format!("({})", spin_orbital),
    }
}
