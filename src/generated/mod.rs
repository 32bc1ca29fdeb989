//! Worked examples of what a DFDL schema compiler emits against this
//! runtime: one module per scenario in the testable-property suite,
//! grounded one-to-one on the C fixtures under
//! `daffodil-codegen-c/.../test/examples/{simple,ex_nums,variablelen,NestedUnion,padtest}`.
//!
//! Each module owns its ERD statics, its record struct(s), and their
//! [`crate::infoset::Infoset`]/[`crate::infoset::ChoiceHost`]/
//! [`crate::infoset::ArrayHost`]/[`crate::walker::WalkNode`] impls — the
//! shape a real code generator would produce once per schema, not a
//! framework abstraction the runtime imposes on it.

pub mod fixed_value;
pub mod mixed_endian;
pub mod nested_union;
pub mod signed17;
pub mod simple_byte;
pub mod variable_array;
