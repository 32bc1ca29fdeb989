//! Scenario 6: a single field constrained by a DFDL `fixed` attribute — the
//! value must parse successfully regardless of content, but any mismatch
//! against the declared fixed value is recorded as a soft diagnostic rather
//! than aborting the parse.
//!
//! Grounded on `validate_fixed_attribute` in
//! `daffodil-codegen-c/.../libruntime/validators.c`, exercised in the style
//! of `examples/padtest`'s fixed-value fields.

use std::io::{BufRead, Read, Write};

use crate::bits::DataEndian;
use crate::erd::{ComplexErd, ElementRuntimeData, LeafErd, NamedQName, TypeCode};
use crate::error::RuntimeError;
use crate::infoset::Infoset;
use crate::leaf::IntLeaf;
use crate::state::{PState, UState};
use crate::validators::validate_fixed_attribute;
use crate::walker::WalkNode;
use crate::xml::reader::parse_int_text;
use crate::xml::{XmlError, XmlInfosetReader};

const FIXED_VALUE: i64 = 32;

static FIELD_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("int_32"), type_code: TypeCode::Int32 };
static ROOT_CHILDREN: [&dyn ElementRuntimeData; 1] = [&FIELD_ERD];
static ROOT_ERD: ComplexErd = ComplexErd {
  named_qname: NamedQName::unqualified("fixed-value-record"),
  type_code: TypeCode::Complex,
  children: &ROOT_CHILDREN,
};

pub struct FixedValue {
  pub int_32: IntLeaf,
}

impl FixedValue {
  pub fn new() -> Self {
    Self { int_32: IntLeaf::new(&FIELD_ERD, DataEndian::Big, 4, 32) }
  }
}

impl Default for FixedValue {
  fn default() -> Self {
    Self::new()
  }
}

impl FixedValue {
  pub fn read_xml<R: BufRead>(reader: &mut XmlInfosetReader<R>) -> Result<Self, XmlError> {
    reader.expect_start("fixed-value-record")?;
    reader.expect_start("int_32")?;
    let text = reader.read_text()?;
    reader.expect_end("fixed-value-record")?;

    let mut record = Self::new();
    record.int_32.value = parse_int_text::<i32>(&text, "int32")? as i64;
    Ok(record)
  }
}

impl Infoset for FixedValue {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.int_32.parse_self(pstate)?;
    validate_fixed_attribute(&mut pstate.pu, "int_32", &self.int_32.value, &FIXED_VALUE);
    Ok(())
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.int_32.unparse_self(ustate)
  }
}

impl WalkNode for FixedValue {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    Some(vec![&self.int_32])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matching_fixed_value_parses_with_no_diagnostics() {
    let mut input: &[u8] = &[0x00, 0x00, 0x00, 0x20];
    let mut pstate = PState::new(&mut input);
    let mut record = FixedValue::new();
    record.parse_self(&mut pstate).unwrap();
    assert_eq!(record.int_32.value, 32);
    assert!(pstate.pu.diagnostics.is_empty());
    assert!(!pstate.pu.has_error());
  }

  #[test]
  fn mismatched_fixed_value_still_parses_but_records_one_diagnostic() {
    let mut input: &[u8] = &[0x00, 0x00, 0x00, 0x21];
    let mut pstate = PState::new(&mut input);
    let mut record = FixedValue::new();
    record.parse_self(&mut pstate).unwrap();
    assert_eq!(record.int_32.value, 33);
    assert!(!pstate.pu.has_error());
    assert_eq!(pstate.pu.diagnostics.len(), 1);
    assert!(matches!(pstate.pu.diagnostics.iter().next(), Some(RuntimeError::RestrFixed("int_32"))));
  }

  #[test]
  fn reads_back_its_own_xml() {
    let xml = "<fixed-value-record><int_32>32</int_32></fixed-value-record>";
    let mut reader = XmlInfosetReader::new(xml.as_bytes());
    let record = FixedValue::read_xml(&mut reader).unwrap();
    assert_eq!(record.int_32.value, 32);
  }
}
