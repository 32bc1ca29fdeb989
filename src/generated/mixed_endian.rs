//! Scenario 2: a big-endian `int32` immediately followed by a
//! little-endian `uint16`, exercising both data-endianness code paths in
//! one record.
//!
//! Grounded on `parse_be_int32`/`parse_le_uint16` in
//! `daffodil-codegen-c/.../libruntime/parsers.c`, in the style of
//! `examples/ex_nums`' mixed-representation fields.

use std::io::{BufRead, Read, Write};

use crate::bits::DataEndian;
use crate::erd::{ComplexErd, ElementRuntimeData, LeafErd, NamedQName, TypeCode};
use crate::error::RuntimeError;
use crate::infoset::Infoset;
use crate::leaf::{IntLeaf, UintLeaf};
use crate::state::{PState, UState};
use crate::walker::WalkNode;
use crate::xml::reader::parse_int_text;
use crate::xml::{XmlError, XmlInfosetReader};

static BIG_INT32_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("big-int32"), type_code: TypeCode::Int32 };
static LITTLE_UINT16_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("little-uint16"), type_code: TypeCode::Uint16 };
static ROOT_CHILDREN: [&dyn ElementRuntimeData; 2] = [&BIG_INT32_ERD, &LITTLE_UINT16_ERD];
static ROOT_ERD: ComplexErd = ComplexErd {
  named_qname: NamedQName::unqualified("mixed-endian-record"),
  type_code: TypeCode::Complex,
  children: &ROOT_CHILDREN,
};

pub struct MixedEndian {
  pub big_int32: IntLeaf,
  pub little_uint16: UintLeaf,
}

impl MixedEndian {
  pub fn new() -> Self {
    Self {
      big_int32: IntLeaf::new(&BIG_INT32_ERD, DataEndian::Big, 4, 32),
      little_uint16: UintLeaf::new(&LITTLE_UINT16_ERD, DataEndian::Little, 2, 16),
    }
  }

  pub fn read_xml<R: BufRead>(reader: &mut XmlInfosetReader<R>) -> Result<Self, XmlError> {
    reader.expect_start("mixed-endian-record")?;
    reader.expect_start("big-int32")?;
    let big_text = reader.read_text()?;
    reader.expect_start("little-uint16")?;
    let little_text = reader.read_text()?;
    reader.expect_end("mixed-endian-record")?;

    let mut record = Self::new();
    record.big_int32.value = parse_int_text::<i32>(&big_text, "int32")? as i64;
    record.little_uint16.value = parse_int_text::<u16>(&little_text, "uint16")? as u64;
    Ok(record)
  }
}

impl Default for MixedEndian {
  fn default() -> Self {
    Self::new()
  }
}

impl Infoset for MixedEndian {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.big_int32.parse_self(pstate)?;
    self.little_uint16.parse_self(pstate)
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.big_int32.unparse_self(ustate)?;
    self.little_uint16.unparse_self(ustate)
  }
}

impl WalkNode for MixedEndian {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    Some(vec![&self.big_int32, &self.little_uint16])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const INPUT: [u8; 6] = [0x00, 0x00, 0x00, 0x2A, 0x39, 0x30];

  #[test]
  fn parses_both_endiannesses() {
    let mut input: &[u8] = &INPUT;
    let mut pstate = PState::new(&mut input);
    let mut record = MixedEndian::new();
    record.parse_self(&mut pstate).unwrap();
    pstate.no_leftover_data();
    assert!(!pstate.pu.has_error());
    assert_eq!(record.big_int32.value, 42);
    assert_eq!(record.little_uint16.value, 12345);
  }

  #[test]
  fn unparse_reproduces_the_six_bytes() {
    let mut input: &[u8] = &INPUT;
    let mut pstate = PState::new(&mut input);
    let mut record = MixedEndian::new();
    record.parse_self(&mut pstate).unwrap();

    let mut out = Vec::new();
    let mut ustate = UState::new(&mut out);
    record.unparse_self(&mut ustate).unwrap();
    ustate.flush_fragment_byte(0);
    assert_eq!(out, INPUT);
  }

  #[test]
  fn reads_back_its_own_xml() {
    let xml = "<mixed-endian-record><big-int32>42</big-int32><little-uint16>12345</little-uint16></mixed-endian-record>";
    let mut reader = XmlInfosetReader::new(xml.as_bytes());
    let record = MixedEndian::read_xml(&mut reader).unwrap();
    assert_eq!(record.big_int32.value, 42);
    assert_eq!(record.little_uint16.value, 12345);
  }
}
