//! The infoset walker: one traversal driving arbitrary consumers
//! (currently the XML reader/writer pair in [`crate::xml`]) over any
//! generated infoset tree, independent of its concrete shape.
//!
//! Grounded on `walk_infoset`/`walk_infoset_node`/`walk_array`/
//! `walk_infoset_node_children` in
//! `daffodil-codegen-c/.../libruntime/infoset.c`, and on a visitor trait
//! shape with an associated error type plus one fallible method per
//! event, each a short-circuiting `?`.
//!
//! [`WalkNode`] is deliberately a second, object-safe trait distinct from
//! [`crate::infoset::Infoset`]/[`crate::infoset::ArrayHost`]/
//! [`crate::infoset::ChoiceHost`]: those three are what generated
//! `parse_self`/`unparse_self` bodies call against a concrete, statically
//! known type, with zero indirection on the hot bit-level path. The walker
//! instead needs to treat a `Complex`'s heterogeneous, differently-typed
//! fields uniformly, which only a trait-object view can do — the same
//! split the original makes between `ERD.parseSelf` (a direct call) and
//! `walk_infoset_node` (dispatch purely on `typeCode`).

use crate::erd::{ElementRuntimeData, TypeCode};

/// A type-erased primitive value, handed to
/// [`VisitEventHandler::visit_simple_elem`] for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimpleValue<'a> {
  Boolean(bool),
  Float(f32),
  Double(f64),
  HexBinary(&'a [u8]),
  Int8(i8),
  Int16(i16),
  Int32(i32),
  Int64(i64),
  Uint8(u8),
  Uint16(u16),
  Uint32(u32),
  Uint64(u64),
}

/// The object-safe view of an infoset node the walker traverses.
///
/// Exactly one of `as_simple`/`as_complex`/`as_array`/`as_choice` returns
/// `Some` for any given node, determined by `erd().type_code()`; the
/// others keep their `None` default. Which one is generated code's
/// responsibility to override, the same way the original's `typeCode`
/// field commits a node to exactly one of `walk_array`/
/// `walk_infoset_node_children`/`visitSimpleElem`.
pub trait WalkNode {
  fn erd(&self) -> &'static dyn ElementRuntimeData;

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    None
  }

  /// Children in declaration order, for a `Complex` node.
  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    None
  }

  /// Elements in index order, for an `Array` node.
  fn as_array(&self) -> Option<Vec<&dyn WalkNode>> {
    None
  }

  /// The currently-live branch, for a `Choice` node. `None` if parsing
  /// never reached `init_choice` for this node (e.g. an optional choice
  /// inside an array that stopped growing before this slot).
  fn as_choice(&self) -> Option<&dyn WalkNode> {
    None
  }
}

/// Implemented by anything that consumes a walked infoset: an XML writer
/// serializing it out, an XML reader replaying parsed text back over a
/// tree it drives choices/array growth for, a debug dumper, and so on.
///
/// Every method can fail and every failure short-circuits the walk
/// (`walk_infoset_node_children` in the original stops at the first
/// visitor callback that returns non-OK, same as this trait's `?`-based
/// propagation).
pub trait VisitEventHandler {
  type Err: std::error::Error;

  fn visit_start_document(&mut self) -> Result<(), Self::Err> {
    Ok(())
  }

  fn visit_end_document(&mut self) -> Result<(), Self::Err> {
    Ok(())
  }

  fn visit_start_complex(&mut self, erd: &'static dyn ElementRuntimeData) -> Result<(), Self::Err>;

  fn visit_end_complex(&mut self, erd: &'static dyn ElementRuntimeData) -> Result<(), Self::Err>;

  fn visit_simple_elem(&mut self, erd: &'static dyn ElementRuntimeData, value: SimpleValue<'_>) -> Result<(), Self::Err>;
}

/// Walks `root` with `visitor`, bracketing the whole traversal with
/// `visit_start_document`/`visit_end_document` (`walk_infoset` in the
/// original).
pub fn walk_infoset<V: VisitEventHandler>(root: &dyn WalkNode, visitor: &mut V) -> Result<(), V::Err> {
  visitor.visit_start_document()?;
  walk_node(root, visitor)?;
  visitor.visit_end_document()
}

fn walk_node<V: VisitEventHandler>(node: &dyn WalkNode, visitor: &mut V) -> Result<(), V::Err> {
  match node.erd().type_code() {
    TypeCode::Array => {
      let elements = node.as_array().expect("array-typed node must implement as_array");
      for element in elements {
        walk_node(element, visitor)?;
      }
      Ok(())
    }
    TypeCode::Choice => match node.as_choice() {
      Some(branch) => walk_node(branch, visitor),
      None => Ok(()),
    },
    TypeCode::Complex => {
      visitor.visit_start_complex(node.erd())?;
      let children = node.as_complex().expect("complex-typed node must implement as_complex");
      for child in children {
        walk_node(child, visitor)?;
      }
      visitor.visit_end_complex(node.erd())
    }
    _ => {
      let value = node.as_simple().expect("primitive-typed node must implement as_simple");
      visitor.visit_simple_elem(node.erd(), value)
    }
  }
}
