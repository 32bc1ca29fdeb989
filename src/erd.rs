//! Element Runtime Data: the immutable, `'static` descriptor graph that
//! drives parsing, unparsing, and walking.
//!
//! The original runtime wires these together as C structs of function
//! pointers reached through pointer-arithmetic offsets into an opaque
//! record. Per the redesign flags in the specification, this crate
//! re-architects both:
//!
//! - type-erased `parseSelf`/`unparseSelf` function pointers become trait
//!   methods on [`crate::infoset::Infoset`];
//! - `childrenOffsets` byte-offset arithmetic becomes accessor methods
//!   (`child`/`child_mut`, `element`/`element_mut`) that a schema compiler
//!   would emit once per field, never computed from a sentinel instance.
//!
//! [`ElementRuntimeData`] itself stays close to the original `ERD` struct's
//! *shape* — a name, a type code, and the child descriptor list — because
//! that shape is what the walker and the XML adapters both need.

use std::fmt;

/// `(prefix?, local, namespaceURI?)` identifying an infoset element.
///
/// Invariant: `local` is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQName {
  pub prefix: Option<&'static str>,
  pub local: &'static str,
  pub ns: Option<&'static str>,
}

impl NamedQName {
  pub const fn unqualified(local: &'static str) -> Self {
    Self { prefix: None, local, ns: None }
  }

  pub const fn qualified(prefix: &'static str, local: &'static str, ns: &'static str) -> Self {
    Self { prefix: Some(prefix), local, ns: Some(ns) }
  }

  /// The element's lexical name with an optional `prefix:` (§6.1
  /// `get_erd_name`), truncated to [`crate::error::LIMIT_NAME_LENGTH`].
  pub fn rendered_name(&self) -> String {
    let mut name = match self.prefix {
      Some(p) => format!("{p}:{}", self.local),
      None => self.local.to_string(),
    };
    name.truncate(crate::error::LIMIT_NAME_LENGTH);
    name
  }

  /// The `xmlns[:prefix]` attribute key to use for this element, if it
  /// declares a namespace URI (§6.1 `get_erd_xmlns`).
  pub fn xmlns_attr_name(&self) -> Option<String> {
    self.ns.map(|_| match self.prefix {
      Some(p) => format!("xmlns:{p}"),
      None => "xmlns".to_string(),
    })
  }
}

/// Closed enumeration of infoset node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
  Complex,
  Choice,
  Array,
  Boolean,
  Float,
  Double,
  HexBinary,
  Int8,
  Int16,
  Int32,
  Int64,
  Uint8,
  Uint16,
  Uint32,
  Uint64,
}

impl TypeCode {
  pub fn is_primitive(&self) -> bool {
    !matches!(self, TypeCode::Complex | TypeCode::Choice | TypeCode::Array)
  }
}

impl fmt::Display for TypeCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      TypeCode::Complex => "complex",
      TypeCode::Choice => "choice",
      TypeCode::Array => "array",
      TypeCode::Boolean => "boolean",
      TypeCode::Float => "float",
      TypeCode::Double => "double",
      TypeCode::HexBinary => "hexBinary",
      TypeCode::Int8 => "int8",
      TypeCode::Int16 => "int16",
      TypeCode::Int32 => "int32",
      TypeCode::Int64 => "int64",
      TypeCode::Uint8 => "uint8",
      TypeCode::Uint16 => "uint16",
      TypeCode::Uint32 => "uint32",
      TypeCode::Uint64 => "uint64",
    };
    f.write_str(s)
  }
}

/// Immutable descriptor owned by generated static data: one per complex
/// type, per array, per choice placeholder, and per primitive field.
///
/// This is a marker/identity object only — it carries no function
/// pointers. The behavior the original attaches to an `ERD`
/// (`parseSelf`/`unparseSelf`/`initChoice`/`getArraySize`) instead lives on
/// the generated record type via [`crate::infoset::Infoset`],
/// [`crate::infoset::ChoiceHost`] and [`crate::infoset::ArrayHost`], reached
/// through ordinary trait dispatch rather than a cast function pointer.
pub trait ElementRuntimeData: Sync {
  fn named_qname(&self) -> NamedQName;
  fn type_code(&self) -> TypeCode;

  /// Descriptors of this node's children, in declaration order. Empty for
  /// primitives. For `Array`, holds the single element descriptor
  /// (`childrenERDs[0]` in the original). For `Choice`, holds the
  /// descriptors of every possible variant so consumers that need to know
  /// the full alternative set (e.g. an XML reader resolving an element
  /// name back to a branch) can inspect them without having parsed yet.
  fn children(&self) -> &'static [&'static dyn ElementRuntimeData];
}

/// A static, zero-behavior [`ElementRuntimeData`] used for primitive leaf
/// fields and array element placeholders — the common case where the only
/// thing generated code needs to say is "this is a `uint16` named `foo`".
#[derive(Debug)]
pub struct LeafErd {
  pub named_qname: NamedQName,
  pub type_code: TypeCode,
}

impl ElementRuntimeData for LeafErd {
  fn named_qname(&self) -> NamedQName {
    self.named_qname
  }

  fn type_code(&self) -> TypeCode {
    self.type_code
  }

  fn children(&self) -> &'static [&'static dyn ElementRuntimeData] {
    &[]
  }
}

/// An [`ElementRuntimeData`] for `Complex`, `Array`, and `Choice` nodes,
/// which (unlike a primitive leaf) carry a non-empty `childrenERDs` list.
#[derive(Debug)]
pub struct ComplexErd {
  pub named_qname: NamedQName,
  pub type_code: TypeCode,
  pub children: &'static [&'static dyn ElementRuntimeData],
}

impl ElementRuntimeData for ComplexErd {
  fn named_qname(&self) -> NamedQName {
    self.named_qname
  }

  fn type_code(&self) -> TypeCode {
    self.type_code
  }

  fn children(&self) -> &'static [&'static dyn ElementRuntimeData] {
    self.children
  }
}
