//! Scenario 1: a record holding one signed byte.
//!
//! Grounded on `daffodil-codegen-c/.../test/examples/simple/generated_code.c`
//! (`simple_byte_ERD`, `simple_byte__parseSelf`/`unparseSelf`).

use std::io::{BufRead, Read, Write};

use crate::bits::DataEndian;
use crate::erd::{ComplexErd, ElementRuntimeData, LeafErd, NamedQName, TypeCode};
use crate::error::RuntimeError;
use crate::infoset::Infoset;
use crate::leaf::IntLeaf;
use crate::state::{PState, UState};
use crate::walker::WalkNode;
use crate::xml::reader::parse_int_text;
use crate::xml::{XmlError, XmlInfosetReader};

static FIELD_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("simple-byte"), type_code: TypeCode::Int8 };
static ROOT_CHILDREN: [&dyn ElementRuntimeData; 1] = [&FIELD_ERD];
static ROOT_ERD: ComplexErd = ComplexErd {
  named_qname: NamedQName::unqualified("simple-byte-record"),
  type_code: TypeCode::Complex,
  children: &ROOT_CHILDREN,
};

pub struct SimpleByte {
  pub simple_byte: IntLeaf,
}

impl SimpleByte {
  pub fn new() -> Self {
    Self { simple_byte: IntLeaf::new(&FIELD_ERD, DataEndian::Big, 1, 8) }
  }

  /// Rebuilds a record from the XML shape [`XmlInfosetWriter`](crate::xml::XmlInfosetWriter)
  /// produces for it, ready for [`Infoset::unparse_self`].
  pub fn read_xml<R: BufRead>(reader: &mut XmlInfosetReader<R>) -> Result<Self, XmlError> {
    reader.expect_start("simple-byte-record")?;
    reader.expect_start("simple-byte")?;
    let text = reader.read_text()?;
    let mut record = Self::new();
    record.simple_byte.value = parse_int_text::<i8>(&text, "int8")? as i64;
    reader.expect_end("simple-byte-record")?;
    Ok(record)
  }
}

impl Default for SimpleByte {
  fn default() -> Self {
    Self::new()
  }
}

impl Infoset for SimpleByte {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.simple_byte.parse_self(pstate)
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.simple_byte.unparse_self(ustate)
  }
}

impl WalkNode for SimpleByte {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    Some(vec![&self.simple_byte])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::walker::walk_infoset;
  use crate::xml::XmlInfosetWriter;
  use std::io::Cursor;

  #[test]
  fn parses_single_byte() {
    let mut input: &[u8] = &[0x2A];
    let mut pstate = PState::new(&mut input);
    let mut record = SimpleByte::new();
    record.parse_self(&mut pstate).unwrap();
    assert_eq!(record.simple_byte.value, 42);
    pstate.no_leftover_data();
    assert!(!pstate.pu.has_error());
  }

  #[test]
  fn walks_to_expected_xml_fragment() {
    let mut record = SimpleByte::new();
    record.simple_byte.value = 42;
    let mut sink = Cursor::new(Vec::new());
    let mut writer = XmlInfosetWriter::new(&mut sink);
    walk_infoset(&record, &mut writer).unwrap();
    let xml = String::from_utf8(sink.into_inner()).unwrap();
    assert!(xml.contains("<simple-byte>42</simple-byte>"));
  }

  #[test]
  fn round_trips_through_unparse() {
    let mut record = SimpleByte::new();
    record.simple_byte.value = 42;
    let mut out = Vec::new();
    let mut ustate = UState::new(&mut out);
    record.unparse_self(&mut ustate).unwrap();
    ustate.flush_fragment_byte(0);
    assert_eq!(out, vec![0x2A]);
  }

  #[test]
  fn reads_back_its_own_xml() {
    let xml = "<simple-byte-record><simple-byte>42</simple-byte></simple-byte-record>";
    let mut reader = XmlInfosetReader::new(xml.as_bytes());
    let record = SimpleByte::read_xml(&mut reader).unwrap();
    assert_eq!(record.simple_byte.value, 42);
  }
}
