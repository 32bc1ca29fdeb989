//! DFDL schema validation: the soft-diagnostic checks a generated
//! `parse_self` runs after reading a value, plus the one hard structural
//! check (array bounds).
//!
//! Grounded on `validate_array_bounds`/`validate_fixed_attribute`/
//! `validate_floatpt_enumeration`/`validate_hexbinary_enumeration`/
//! `validate_integer_enumeration`/`validate_schema_range` in
//! `daffodil-codegen-c/.../libruntime/validators.c`. All but the array
//! bounds check append to [`crate::error::Diagnostics`] and let parsing
//! continue; only `validate_array_bounds` sets `pstate.pu.error` and is
//! first-error-wins fatal, matching the original's split.

use crate::error::RuntimeError;
use crate::infoset::HexBinary;
use crate::state::ParserOrUnparserState;

/// Hard failure: an array's occurrence count fell outside
/// `[min_occurs, max_occurs]`. Unlike every other validator here, this one
/// populates `state.error` because an out-of-bounds array is a structural
/// violation the rest of the infoset can't be trusted after, not a
/// recoverable content mismatch.
pub fn validate_array_bounds(
  state: &mut ParserOrUnparserState,
  name: &'static str,
  actual_occurs: usize,
  min_occurs: usize,
  max_occurs: usize,
) {
  if actual_occurs < min_occurs || actual_occurs > max_occurs {
    state.fail(RuntimeError::ArrayBounds(name));
  }
}

/// Soft: the parsed value must equal the schema's `fixed` attribute.
pub fn validate_fixed_attribute<T: PartialEq>(
  state: &mut ParserOrUnparserState,
  name: &'static str,
  actual: &T,
  fixed: &T,
) {
  if actual != fixed {
    state.diagnostics.push(RuntimeError::RestrFixed(name));
  }
}

/// Soft: the parsed floating-point value must equal one of `enumeration`.
pub fn validate_floatpt_enumeration(state: &mut ParserOrUnparserState, name: &'static str, actual: f64, enumeration: &[f64]) {
  if !enumeration.iter().any(|v| *v == actual) {
    state.diagnostics.push(RuntimeError::RestrEnum(name));
  }
}

/// Soft: the parsed hexBinary value must byte-for-byte equal one member of
/// `enumeration`.
pub fn validate_hexbinary_enumeration(state: &mut ParserOrUnparserState, name: &'static str, actual: &HexBinary, enumeration: &[&[u8]]) {
  if !enumeration.iter().any(|v| *v == actual.bytes.as_slice()) {
    state.diagnostics.push(RuntimeError::RestrEnum(name));
  }
}

/// Soft: the parsed integer value must equal one of `enumeration`.
pub fn validate_integer_enumeration(state: &mut ParserOrUnparserState, name: &'static str, actual: i64, enumeration: &[i64]) {
  if !enumeration.iter().any(|v| *v == actual) {
    state.diagnostics.push(RuntimeError::RestrEnum(name));
  }
}

/// Soft: the parsed integer value must fall within `[min, max]`.
pub fn validate_schema_range(state: &mut ParserOrUnparserState, name: &'static str, actual: i64, min: i64, max: i64) {
  if actual < min || actual > max {
    state.diagnostics.push(RuntimeError::RestrRange(name));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn array_bounds_violation_is_fatal_not_a_diagnostic() {
    let mut state = ParserOrUnparserState::new();
    validate_array_bounds(&mut state, "items", 5, 1, 3);
    assert_eq!(state.error, Some(RuntimeError::ArrayBounds("items")));
    assert!(state.diagnostics.is_empty());
  }

  #[test]
  fn array_bounds_within_range_is_a_no_op() {
    let mut state = ParserOrUnparserState::new();
    validate_array_bounds(&mut state, "items", 2, 1, 3);
    assert!(!state.has_error());
  }

  #[test]
  fn fixed_attribute_mismatch_is_a_soft_diagnostic() {
    let mut state = ParserOrUnparserState::new();
    validate_fixed_attribute(&mut state, "magic", &7u32, &9u32);
    assert!(!state.has_error());
    assert_eq!(state.diagnostics.len(), 1);
  }

  #[test]
  fn fixed_attribute_match_adds_no_diagnostic() {
    let mut state = ParserOrUnparserState::new();
    validate_fixed_attribute(&mut state, "magic", &9u32, &9u32);
    assert!(state.diagnostics.is_empty());
  }

  #[test]
  fn floatpt_enumeration_rejects_values_not_in_the_set() {
    let mut state = ParserOrUnparserState::new();
    validate_floatpt_enumeration(&mut state, "ratio", 0.5, &[1.0, 2.0]);
    assert_eq!(state.diagnostics.len(), 1);
  }

  #[test]
  fn hexbinary_enumeration_accepts_a_byte_for_byte_match() {
    let mut state = ParserOrUnparserState::new();
    let actual = HexBinary::fixed(vec![0xDE, 0xAD]);
    validate_hexbinary_enumeration(&mut state, "magic", &actual, &[&[0xDE, 0xAD], &[0xBE, 0xEF]]);
    assert!(state.diagnostics.is_empty());
  }

  #[test]
  fn hexbinary_enumeration_rejects_a_non_matching_value() {
    let mut state = ParserOrUnparserState::new();
    let actual = HexBinary::fixed(vec![0x01]);
    validate_hexbinary_enumeration(&mut state, "magic", &actual, &[&[0xDE, 0xAD]]);
    assert_eq!(state.diagnostics.len(), 1);
  }

  #[test]
  fn integer_enumeration_accepts_a_listed_value() {
    let mut state = ParserOrUnparserState::new();
    validate_integer_enumeration(&mut state, "code", 2, &[1, 2, 3]);
    assert!(state.diagnostics.is_empty());
  }

  #[test]
  fn schema_range_rejects_values_outside_the_bounds() {
    let mut state = ParserOrUnparserState::new();
    validate_schema_range(&mut state, "age", -1, 0, 120);
    assert_eq!(state.diagnostics.len(), 1);
    validate_schema_range(&mut state, "age", 30, 0, 120);
    assert_eq!(state.diagnostics.len(), 1);
  }

  #[test]
  fn diagnostics_beyond_the_limit_are_silently_dropped() {
    let mut state = ParserOrUnparserState::new();
    for _ in 0..(crate::error::LIMIT_DIAGNOSTICS + 10) {
      validate_schema_range(&mut state, "age", -1, 0, 120);
    }
    assert_eq!(state.diagnostics.len(), crate::error::LIMIT_DIAGNOSTICS);
  }
}
