//! Scenario 3: a single big-endian signed integer narrower than any whole
//! byte count — the sub-byte fragment and sign-extension path exercised
//! with no neighboring fields to obscure it.
//!
//! Grounded on `parse_endian_int64`'s big-endian branch in
//! `daffodil-codegen-c/.../libruntime/parsers.c`; storage is `i32` (the
//! smallest native width that holds 17 bits) per spec.md §9's resolution
//! that storage width is the declared Rust type's width, not always 64
//! bits.

use std::io::{BufRead, Read, Write};

use crate::bits::DataEndian;
use crate::erd::{ElementRuntimeData, LeafErd, NamedQName, TypeCode};
use crate::error::RuntimeError;
use crate::infoset::Infoset;
use crate::leaf::IntLeaf;
use crate::state::{PState, UState};
use crate::walker::WalkNode;
use crate::xml::reader::parse_int_text;
use crate::xml::{XmlError, XmlInfosetReader};

static ROOT_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("signed17"), type_code: TypeCode::Int32 };

pub struct Signed17 {
  pub value: IntLeaf,
}

impl Signed17 {
  pub fn new() -> Self {
    Self { value: IntLeaf::new(&ROOT_ERD, DataEndian::Big, 4, 17) }
  }

  pub fn read_xml<R: BufRead>(reader: &mut XmlInfosetReader<R>) -> Result<Self, XmlError> {
    reader.expect_start("signed17")?;
    let text = reader.read_text()?;
    let mut record = Self::new();
    record.value.value = parse_int_text::<i32>(&text, "int32")? as i64;
    Ok(record)
  }
}

impl Default for Signed17 {
  fn default() -> Self {
    Self::new()
  }
}

impl Infoset for Signed17 {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.value.parse_self(pstate)
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.value.unparse_self(ustate)
  }
}

impl WalkNode for Signed17 {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn as_simple(&self) -> Option<crate::walker::SimpleValue<'_>> {
    self.value.as_simple()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seventeen_ones_sign_extends_to_minus_one() {
    let mut input: &[u8] = &[0xFF, 0xFF, 0x80];
    let mut pstate = PState::new(&mut input);
    let mut record = Signed17::new();
    record.parse_self(&mut pstate).unwrap();
    assert_eq!(record.value.value, -1);
  }

  #[test]
  fn round_trips() {
    let mut record = Signed17::new();
    record.value.value = -1;
    let mut out = Vec::new();
    let mut ustate = UState::new(&mut out);
    record.unparse_self(&mut ustate).unwrap();
    ustate.flush_fragment_byte(0);
    assert_eq!(out, vec![0xFF, 0xFF, 0x80]);
  }

  #[test]
  fn reads_back_its_own_xml() {
    let xml = "<signed17>-1</signed17>";
    let mut reader = XmlInfosetReader::new(xml.as_bytes());
    let record = Signed17::read_xml(&mut reader).unwrap();
    assert_eq!(record.value.value, -1);
  }
}
