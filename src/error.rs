//! The runtime's error taxonomy.
//!
//! Mirrors the three error bands of the original DFDL-generated-code runtime:
//! fatal errors that stop a parse/unparse (`RuntimeError`), soft validation
//! diagnostics that accumulate in [`Diagnostics`], and (outside this crate,
//! in `dfdl-cli`) front-end errors layered on top of `RuntimeError`.
//!
//! Every fatal error carries at most one formatted argument, never owned
//! storage borrowed from the stream — the runtime itself never allocates to
//! report an error.

use std::fmt;

use arrayvec::ArrayVec;
use quick_error::quick_error;

/// Limits on how many elements fixed-capacity buffers can hold.
pub const LIMIT_DIAGNOSTICS: usize = 100;
/// Limits how long a rendered infoset element name may become.
pub const LIMIT_NAME_LENGTH: usize = 9999;

quick_error! {
  /// Fatal errors (band 1) and soft validation diagnostics (band 2).
  ///
  /// A value of this type populates [`crate::state::ParserOrUnparserState::error`]
  /// (band 1) or is appended to a [`Diagnostics`] buffer (band 2); the two
  /// bands share one enum because both are "the same shape of thing" —
  /// a tag plus one argument — and a single lookup table can format either.
  #[derive(Debug, Clone, PartialEq)]
  pub enum RuntimeError {
    /// Array element count fell outside `[minOccurs, maxOccurs]`. Hard
    /// failure: a structural invariant, not a validation warning.
    ArrayBounds(name: &'static str) {
      display("array '{}' has a number of occurrences outside of its allowed bounds", name)
    }
    /// A choice discriminator matched no declared branch.
    ChoiceKey(key: i64) {
      display("no match between choice dispatch key {} and any branch key", key)
    }
    /// Allocating a dynamic hexBinary buffer of the given size failed.
    HexBinaryAlloc(num_bytes: usize) {
      display("error allocating hexBinary memory -- {} bytes", num_bytes)
    }
    /// Data remained in the stream (or in the fragment buffer) after the
    /// root element finished parsing.
    LeftoverData(bits: u8) {
      display("left over data, {} bit(s) at least", bits)
    }
    /// A binary boolean value matched neither its true nor false representation.
    ParseBool(value: u64) {
      display("error parsing binary value {} as either true or false", value)
    }
    /// Soft: value did not match any enumeration member.
    RestrEnum(element: &'static str) {
      display("value of element '{}' does not match any of its enumeration values", element)
    }
    /// Soft: value did not match its declared `fixed` attribute.
    RestrFixed(element: &'static str) {
      display("value of element '{}' does not match value of its 'fixed' attribute", element)
    }
    /// Soft: value fell outside its declared schema range.
    RestrRange(element: &'static str) {
      display("value of element '{}' is outside of its allowed range", element)
    }
    /// Hit end-of-stream while a primitive read still needed more bytes.
    StreamEof {
      display("EOF in stream, stopping program")
    }
    /// The underlying stream reported an I/O error.
    StreamError(err: String) {
      display("error in stream: {}", err)
    }
  }
}

impl RuntimeError {
  /// True for the band-1 "stop the whole run" errors; false for band-2
  /// soft diagnostics (`Restr*`), which never populate `state.error`.
  pub fn is_fatal(&self) -> bool {
    !matches!(
      self,
      RuntimeError::RestrEnum(_) | RuntimeError::RestrFixed(_) | RuntimeError::RestrRange(_)
    )
  }
}

impl From<std::io::Error> for RuntimeError {
  fn from(err: std::io::Error) -> Self {
    match err.kind() {
      std::io::ErrorKind::UnexpectedEof => RuntimeError::StreamEof,
      _ => RuntimeError::StreamError(err.to_string()),
    }
  }
}

/// A bounded sequence of soft validation failures accumulated during a
/// parse or unparse run.
///
/// Mirrors `Diagnostics`/`LIMIT_DIAGNOSTICS` in the original runtime:
/// attempts to add beyond the compile-time maximum silently drop further
/// entries rather than growing unbounded or erroring.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
  entries: ArrayVec<RuntimeError, LIMIT_DIAGNOSTICS>,
}

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `error`, returning `false` (and dropping it) if the buffer is
  /// already at `LIMIT_DIAGNOSTICS`.
  pub fn push(&mut self, error: RuntimeError) -> bool {
    self.entries.try_push(error).is_ok()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &RuntimeError> {
    self.entries.iter()
  }
}

impl fmt::Display for Diagnostics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.entries.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{}", e)?;
    }
    Ok(())
  }
}
