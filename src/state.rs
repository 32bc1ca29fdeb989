//! `PState`/`UState`: the mutable, exclusively-owned state threaded through
//! a single parse or unparse run.
//!
//! Grounded on `ParserOrUnparserState`/`PState`/`UState` in
//! `daffodil-codegen-c/.../libruntime/infoset.h`. The fragment byte stays
//! coupled with stream I/O inside the state, per the "shared fragment
//! byte" redesign flag — only the *ownership* story changes: a `PState`/
//! `UState` borrows its stream for exactly one run instead of reaching it
//! through a process-wide `FILE *`.

use std::io::{Read, Write};

use crate::error::{Diagnostics, RuntimeError};
use crate::infoset::Infoset;

/// Fields common to both the parser and unparser state.
#[derive(Debug)]
pub struct ParserOrUnparserState {
  /// 0-based position of the next bit to read/write, at 1-bit granularity.
  pub bit_pos_0b: u64,
  /// Soft validation diagnostics accumulated so far, if any were produced.
  pub diagnostics: Diagnostics,
  /// The first fatal error encountered, if any. Once set, every subsequent
  /// codec/nested call is a no-op at entry (first-error-wins).
  pub error: Option<RuntimeError>,
}

impl ParserOrUnparserState {
  pub fn new() -> Self {
    Self { bit_pos_0b: 0, diagnostics: Diagnostics::new(), error: None }
  }

  /// Records `error` as the state's fatal error if one isn't already set
  /// (first-error-wins: later failures during unwind must never overwrite
  /// the first).
  pub fn fail(&mut self, error: RuntimeError) {
    if self.error.is_none() {
      self.error = Some(error);
    }
  }

  pub fn has_error(&self) -> bool {
    self.error.is_some()
  }
}

/// Mutable state while parsing a byte stream into an infoset.
///
/// Invariant: when `fragment_len == 0`, the next read comes directly from
/// the stream; when `fragment_len > 0`, the high `fragment_len` bits of
/// `fragment_bits` hold the next bits to deliver, right-aligned in the low
/// end until drawn.
pub struct PState<'s, R: std::io::Read + ?Sized> {
  pub stream: &'s mut R,
  pub pu: ParserOrUnparserState,
  pub(crate) fragment_bits: u8,
  pub(crate) fragment_len: u8,
}

impl<'s, R: std::io::Read + ?Sized> PState<'s, R> {
  pub fn new(stream: &'s mut R) -> Self {
    Self { stream, pu: ParserOrUnparserState::new(), fragment_bits: 0, fragment_len: 0 }
  }

  pub fn fragment_len(&self) -> u8 {
    self.fragment_len
  }
}

/// Mutable state while unparsing an infoset to a byte stream.
///
/// Invariant: when `fragment_len > 0`, those bits are pending and have not
/// yet been written to the stream; the final unparse step flushes them
/// padded to a byte boundary.
pub struct UState<'s, W: std::io::Write + ?Sized> {
  pub stream: &'s mut W,
  pub pu: ParserOrUnparserState,
  pub(crate) fragment_bits: u8,
  pub(crate) fragment_len: u8,
}

impl<'s, W: std::io::Write + ?Sized> UState<'s, W> {
  pub fn new(stream: &'s mut W) -> Self {
    Self { stream, pu: ParserOrUnparserState::new(), fragment_bits: 0, fragment_len: 0 }
  }

  pub fn fragment_len(&self) -> u8 {
    self.fragment_len
  }
}

/// Runs a full parse of `record` from `pstate`'s stream: `parseSelf`
/// followed by the `no_leftover_data` end-of-stream check, per spec.md
/// §4.5's composed parse entry point. Returns the first fatal error
/// encountered by either step, if any; soft diagnostics are left in
/// `pstate.pu.diagnostics` for the caller to inspect or log.
pub fn parse_data<T, R>(record: &mut T, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError>
where
  T: Infoset,
  R: Read + ?Sized,
{
  record.parse_self(pstate)?;
  pstate.no_leftover_data();
  match pstate.pu.error.clone() {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

/// Runs a full unparse of `record` to `ustate`'s stream: `unparseSelf`
/// followed by flushing any pending sub-byte fragment, per spec.md §4.5's
/// composed unparse entry point.
pub fn unparse_infoset<T, W>(record: &T, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError>
where
  T: Infoset,
  W: Write + ?Sized,
{
  record.unparse_self(ustate)?;
  ustate.flush_fragment_byte(0);
  match ustate.pu.error.clone() {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fail_keeps_the_first_error_and_ignores_later_ones() {
    let mut pu = ParserOrUnparserState::new();
    assert!(!pu.has_error());
    pu.fail(RuntimeError::StreamEof);
    pu.fail(RuntimeError::ChoiceKey(7));
    assert_eq!(pu.error, Some(RuntimeError::StreamEof));
  }

  #[test]
  fn pstate_starts_at_bit_zero_with_no_fragment() {
    let mut bytes: &[u8] = &[0u8; 4];
    let pstate = PState::new(&mut bytes);
    assert_eq!(pstate.pu.bit_pos_0b, 0);
    assert_eq!(pstate.fragment_len(), 0);
    assert!(!pstate.pu.has_error());
  }

  #[test]
  fn ustate_starts_at_bit_zero_with_no_fragment() {
    let mut out: Vec<u8> = Vec::new();
    let ustate = UState::new(&mut out);
    assert_eq!(ustate.pu.bit_pos_0b, 0);
    assert_eq!(ustate.fragment_len(), 0);
  }
}
