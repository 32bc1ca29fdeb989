//! The infoset: the in-memory tree generated code parses into and unparses
//! from, and the traits that let the walker and the codec drive it
//! uniformly regardless of the concrete generated record type.
//!
//! Grounded on `InfosetBase`/`HexBinary`/`ERD.parseSelf`/`ERD.unparseSelf`/
//! `ERD.initChoice`/`ERD.getArraySize` in
//! `daffodil-codegen-c/.../libruntime/infoset.h` and `infoset.c`. Two
//! redesign flags apply here directly:
//!
//! - the original's function-pointer `parseSelf`/`unparseSelf`/`initChoice`
//!   cast through a `void *` become the [`Infoset`] and [`ChoiceHost`]
//!   trait methods below, dispatched by the compiler rather than by a
//!   runtime cast;
//! - the original's cyclic `InfosetBase.parent` back-pointer is gone: a
//!   walk or codec call always receives the root of the tree it's
//!   operating on explicitly, rather than climbing parent pointers to find
//!   it.

use std::io::{Read, Write};

use crate::erd::ElementRuntimeData;
use crate::error::RuntimeError;
use crate::state::{PState, UState};

/// A dynamically- or statically-sized opaque byte buffer (`xs:hexBinary`).
///
/// `dynamic` mirrors the original's distinction between a hexBinary whose
/// length is fixed by the schema (the buffer is part of the generated
/// struct's inline storage and is never freed) and one whose length is
/// only known at parse time (the buffer is heap-allocated per parse via
/// [`PState::alloc_hex_binary`] and must be released before a second parse
/// re-initializes it — the open question resolved in spec.md §9: `init_self`
/// frees any owned buffer *before* resetting to empty, never after).
#[derive(Debug, Clone, Default)]
pub struct HexBinary {
  pub bytes: Vec<u8>,
  pub dynamic: bool,
}

impl HexBinary {
  pub const fn fixed(bytes: Vec<u8>) -> Self {
    Self { bytes, dynamic: false }
  }

  pub const fn dynamic() -> Self {
    Self { bytes: Vec::new(), dynamic: true }
  }

  /// Drops any owned buffer and resets to empty. A no-op for fixed-length
  /// hexBinary fields (their storage is schema-sized, never freed).
  pub fn reset(&mut self) {
    if self.dynamic {
      self.bytes = Vec::new();
    }
  }
}

/// Implemented by every generated infoset node: complex types, array
/// element wrappers, and primitive leaf fields alike.
///
/// `parse_self`/`unparse_self` replace the original's `ERD.parseSelf`/
/// `unparseSelf` function pointers. A leaf's `parse_self` reads its one
/// primitive value and advances `pstate`; a complex type's `parse_self`
/// calls `parse_self` on each child in turn. Either way the walker
/// ([`crate::walker`]) never needs to know which.
pub trait Infoset {
  fn erd(&self) -> &'static dyn ElementRuntimeData;

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError>;
  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError>;
}

/// Implemented by a choice placeholder's generated wrapper type.
///
/// Replaces `ERD.initChoice`: given the already-parsed discriminator, picks
/// and initializes the live variant (freeing/resetting whatever the
/// previous parse of this node left behind, per the hexBinary reset rule)
/// before `parse_self` is called on the chosen branch.
pub trait ChoiceHost: Infoset {
  fn init_choice(&mut self, dispatch_key: i64) -> Result<(), RuntimeError>;
}

/// Implemented by a generated array wrapper type.
///
/// Replaces `ERD.getArraySize` plus the `childrenOffsets[0]`-stride
/// indexing `walk_array` used to reach each element: `len`/`element`/
/// `element_mut` are ordinary accessor methods a schema compiler emits
/// once, rather than pointer arithmetic computed from a sentinel element's
/// address.
pub trait ArrayHost: Infoset {
  type Element: Infoset;

  fn len(&self) -> usize;
  fn element(&self, index: usize) -> &Self::Element;
  fn element_mut(&mut self, index: usize) -> &mut Self::Element;

  /// Appends a freshly defaulted element and returns it for `parse_self`
  /// to fill in. Parsing a variable-length array grows this way one
  /// element at a time; unparsing only ever reads, never calls this.
  fn push_default(&mut self) -> &mut Self::Element;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_hex_binary_reset_is_a_no_op() {
    let mut h = HexBinary::fixed(vec![1, 2, 3]);
    h.reset();
    assert_eq!(h.bytes, vec![1, 2, 3]);
    assert!(!h.dynamic);
  }

  #[test]
  fn dynamic_hex_binary_reset_drops_its_buffer() {
    let mut h = HexBinary::dynamic();
    h.bytes = vec![1, 2, 3, 4];
    h.reset();
    assert!(h.bytes.is_empty());
    assert!(h.dynamic);
  }

  #[test]
  fn default_hex_binary_is_empty_and_not_dynamic() {
    let h = HexBinary::default();
    assert!(h.bytes.is_empty());
    assert!(!h.dynamic);
  }
}
