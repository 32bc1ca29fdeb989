//! Runtime support for schema-generated DFDL parsers and unparsers: a
//! bit-granular binary codec, an element-runtime-data/infoset model, a
//! walker that drives arbitrary visitors over it, and a concrete XML
//! infoset reader/writer pair.
//!
//! Generated code (see [`generated`] for worked examples) pairs a static
//! [`erd::ElementRuntimeData`] descriptor with a record type implementing
//! [`infoset::Infoset`] (and, where relevant,
//! [`infoset::ChoiceHost`]/[`infoset::ArrayHost`] and
//! [`walker::WalkNode`]). Everything else in this crate — the codec, the
//! walker, the XML adapters — is generic over those traits and never
//! depends on a particular schema.

pub mod bits;
pub mod erd;
pub mod error;
pub mod generated;
pub mod infoset;
pub mod leaf;
pub mod state;
pub mod validators;
pub mod walker;
pub mod xml;

pub use bits::DataEndian;
pub use erd::{ElementRuntimeData, NamedQName, TypeCode};
pub use error::{Diagnostics, RuntimeError};
pub use infoset::{ArrayHost, ChoiceHost, HexBinary, Infoset};
pub use state::{PState, UState, parse_data, unparse_infoset};
pub use walker::{SimpleValue, VisitEventHandler, WalkNode, walk_infoset};
