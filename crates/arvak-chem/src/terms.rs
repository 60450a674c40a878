//! Amplitude + operator token lists.
//!
//! Two layouts appear in documents:
//!
//! - configurations: `[amplitude, op, op, ..., marker]`, e.g.
//!   `["0.5", "(1a)+", "(2a)+", "|vacuum>"]`;
//! - cluster amplitudes: `[amplitude, op, op, ...]`, e.g.
//!   `["0.1", "(3a)+", "(1a)"]`.

use num_complex::Complex64;
use tracing::debug;

use crate::error::{ChemError, ChemResult};
use crate::fermion::{FermionTerm, LadderOperator};
use crate::spin::IndexConvention;
use crate::token::decode_operator;

/// A superposition coefficient paired with its operator product.
pub type AmplitudeTerm = (Complex64, FermionTerm);

/// Parse an amplitude as a finite decimal number.
///
/// Rust's float parser does not consult the host locale, so `"0.5"` means
/// the same thing everywhere and `"0,5"` is always rejected.
pub fn parse_amplitude(token: &str) -> ChemResult<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ChemError::NumberFormat(token.to_string()))
}

fn decode_all<S: AsRef<str>>(
    tokens: &[S],
    convention: IndexConvention,
) -> ChemResult<Vec<LadderOperator>> {
    tokens
        .iter()
        .map(|token| decode_operator(token.as_ref(), convention))
        .collect()
}

fn incomplete<S: AsRef<str>>(tokens: &[S], reason: &'static str) -> ChemError {
    ChemError::IncompleteTerm {
        tokens: tokens.iter().map(|t| t.as_ref().to_string()).collect(),
        reason,
    }
}

/// Parse a configuration and normal-order it.
///
/// When normal ordering leaves exactly one term and that term only creates
/// electrons, its (possibly sign-flipped) coefficient becomes the amplitude.
/// Otherwise the amplitude is `0.0`. The returned term always carries
/// coefficient `1.0`: it is the single normal-ordered term if there is one,
/// or the operators as written if ordering produced zero or several terms.
pub fn parse_configuration<S: AsRef<str>>(
    tokens: &[S],
    convention: IndexConvention,
) -> ChemResult<AmplitudeTerm> {
    let (amplitude, rest) = tokens
        .split_first()
        .ok_or_else(|| incomplete(tokens, "missing amplitude"))?;
    let (_marker, operators) = rest
        .split_last()
        .ok_or_else(|| incomplete(tokens, "missing trailing state marker"))?;

    let amplitude = parse_amplitude(amplitude.as_ref())?;
    let written = FermionTerm::new(decode_all(operators, convention)?, amplitude);

    let mut ordered = written.canonical_order();
    let (amplitude, term) = if ordered.len() == 1 {
        let term = ordered.remove(0);
        let amplitude = if term.is_created_state() {
            term.coefficient
        } else {
            debug!(term = %term, "configuration does not create a state");
            0.0
        };
        (amplitude, term.with_coefficient(1.0))
    } else {
        debug!(
            term = %written,
            n_terms = ordered.len(),
            "normal ordering did not yield a single term"
        );
        (0.0, written.with_coefficient(1.0))
    };

    Ok((Complex64::new(amplitude, 0.0), term))
}

/// Parse a cluster amplitude without normal ordering.
///
/// The operators are kept as written and the term keeps the amplitude as
/// its coefficient.
pub fn parse_cluster_amplitude<S: AsRef<str>>(
    tokens: &[S],
    convention: IndexConvention,
) -> ChemResult<AmplitudeTerm> {
    let (amplitude, operators) = tokens
        .split_first()
        .ok_or_else(|| incomplete(tokens, "missing amplitude"))?;

    let term = FermionTerm::new(
        decode_all(operators, convention)?,
        parse_amplitude(amplitude.as_ref())?,
    );
    Ok((Complex64::new(term.coefficient, 0.0), term))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP_DOWN: IndexConvention = IndexConvention::UpDown;

    fn c(i: usize) -> LadderOperator {
        LadderOperator::creation(i)
    }

    fn a(i: usize) -> LadderOperator {
        LadderOperator::annihilation(i)
    }

    #[test]
    fn test_parse_amplitude() {
        assert_eq!(parse_amplitude("0.5").unwrap(), 0.5);
        assert_eq!(parse_amplitude(" -1e-3 ").unwrap(), -1e-3);
        assert_eq!(parse_amplitude("2").unwrap(), 2.0);
        for bad in ["0,5", "abc", "", "NaN", "inf"] {
            match parse_amplitude(bad) {
                Err(ChemError::NumberFormat(raw)) => assert_eq!(raw, bad),
                other => panic!("expected NumberFormat for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_configuration_in_order() {
        let (amp, term) =
            parse_configuration(&["0.5", "(1a)+", "(2a)+", "|vacuum>"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(0.5, 0.0));
        assert_eq!(term, FermionTerm::new(vec![c(0), c(2)], 1.0));
    }

    #[test]
    fn test_configuration_reordering_moves_sign_into_amplitude() {
        let (amp, term) =
            parse_configuration(&["0.5", "(2a)+", "(1a)+", "|vacuum>"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(-0.5, 0.0));
        assert_eq!(term, FermionTerm::new(vec![c(0), c(2)], 1.0));
    }

    #[test]
    fn test_configuration_marker_is_not_decoded() {
        // The marker would be malformed as an operator token.
        let (_, term) = parse_configuration(&["1.0", "(1b)+", "not-an-op"], UP_DOWN).unwrap();
        assert_eq!(term.operators, vec![c(1)]);
    }

    #[test]
    fn test_vanishing_configuration_has_zero_amplitude() {
        let (amp, term) =
            parse_configuration(&["0.7", "(1a)+", "(1a)+", "|vacuum>"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(0.0, 0.0));
        assert_eq!(term, FermionTerm::new(vec![c(0), c(0)], 1.0));
    }

    #[test]
    fn test_multi_term_configuration_has_zero_amplitude() {
        let (amp, term) =
            parse_configuration(&["0.7", "(1a)", "(1a)+", "|vacuum>"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(0.0, 0.0));
        assert_eq!(term, FermionTerm::new(vec![a(0), c(0)], 1.0));
    }

    #[test]
    fn test_configuration_with_annihilator_has_zero_amplitude() {
        let (amp, term) =
            parse_configuration(&["0.7", "(1a)+", "(2a)", "|vacuum>"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(0.0, 0.0));
        assert_eq!(term, FermionTerm::new(vec![c(0), a(2)], 1.0));
    }

    #[test]
    fn test_empty_configuration_is_vacuum() {
        let (amp, term) = parse_configuration(&["1.0", "|vacuum>"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(1.0, 0.0));
        assert!(term.is_empty());
    }

    #[test]
    fn test_configuration_too_short() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            parse_configuration(&empty, UP_DOWN),
            Err(ChemError::IncompleteTerm { .. })
        ));
        assert!(matches!(
            parse_configuration(&["1.0"], UP_DOWN),
            Err(ChemError::IncompleteTerm { .. })
        ));
    }

    #[test]
    fn test_configuration_malformed_operator_aborts() {
        assert!(matches!(
            parse_configuration(&["1.0", "(1a)+", "junk", "|vacuum>"], UP_DOWN),
            Err(ChemError::MalformedOperatorToken(t)) if t == "junk"
        ));
    }

    #[test]
    fn test_cluster_amplitude_keeps_written_order() {
        let (amp, term) = parse_cluster_amplitude(&["0.1", "(1a)", "(3a)+"], UP_DOWN).unwrap();
        assert_eq!(amp, Complex64::new(0.1, 0.0));
        assert_eq!(term, FermionTerm::new(vec![a(0), c(4)], 0.1));
    }

    #[test]
    fn test_cluster_amplitude_needs_amplitude() {
        let empty: [String; 0] = [];
        assert!(matches!(
            parse_cluster_amplitude(&empty, UP_DOWN),
            Err(ChemError::IncompleteTerm { .. })
        ));
        assert!(matches!(
            parse_cluster_amplitude(&["x", "(1a)+"], UP_DOWN),
            Err(ChemError::NumberFormat(_))
        ));
    }
}
