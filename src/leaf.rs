//! Primitive leaf field wrappers: the small, per-field building blocks a
//! schema compiler emits one of for every scalar element, pairing a
//! static [`ElementRuntimeData`] with the bit-width/endianness the field
//! was declared with and the mutable value itself.
//!
//! There is no direct analogue in the original C runtime — there, a
//! generated field is just a plain struct member plus a `parseSelf`
//! function pointer closed over its width/endianness as compiled-in
//! constants. Rust's trait objects can't borrow a temporary the way a
//! walk over raw struct fields would need to, so these wrappers exist to
//! give every leaf field an address of its own that [`crate::walker::WalkNode`]
//! can hand out a `&dyn` reference to; the parse/unparse behavior they
//! implement is otherwise exactly `parse_endian_*`/`unparse_endian_*`
//! dispatch from [`crate::bits`].

use std::io::{Read, Write};

use crate::bits::DataEndian;
use crate::erd::ElementRuntimeData;
use crate::error::RuntimeError;
use crate::infoset::{HexBinary, Infoset};
use crate::state::{PState, UState};
use crate::walker::{SimpleValue, WalkNode};

/// A signed integer field of 8, 16, 32, or 64 declared storage bits, with
/// `num_bits` (`<= storage_bytes * 8`) of them significant.
pub struct IntLeaf {
  pub erd: &'static dyn ElementRuntimeData,
  pub endian: DataEndian,
  pub storage_bytes: usize,
  pub num_bits: u32,
  pub value: i64,
}

impl IntLeaf {
  pub fn new(erd: &'static dyn ElementRuntimeData, endian: DataEndian, storage_bytes: usize, num_bits: u32) -> Self {
    Self { erd, endian, storage_bytes, num_bits, value: 0 }
  }
}

impl Infoset for IntLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.value = pstate.read_int(self.endian, self.storage_bytes, self.num_bits)?;
    Ok(())
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    ustate.write_int(self.endian, self.storage_bytes, self.num_bits, self.value)
  }
}

impl WalkNode for IntLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    Some(match self.storage_bytes {
      1 => SimpleValue::Int8(self.value as i8),
      2 => SimpleValue::Int16(self.value as i16),
      4 => SimpleValue::Int32(self.value as i32),
      _ => SimpleValue::Int64(self.value),
    })
  }
}

/// The unsigned counterpart of [`IntLeaf`].
pub struct UintLeaf {
  pub erd: &'static dyn ElementRuntimeData,
  pub endian: DataEndian,
  pub storage_bytes: usize,
  pub num_bits: u32,
  pub value: u64,
}

impl UintLeaf {
  pub fn new(erd: &'static dyn ElementRuntimeData, endian: DataEndian, storage_bytes: usize, num_bits: u32) -> Self {
    Self { erd, endian, storage_bytes, num_bits, value: 0 }
  }
}

impl Infoset for UintLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.value = pstate.read_uint(self.endian, self.storage_bytes, self.num_bits)?;
    Ok(())
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    ustate.write_uint(self.endian, self.storage_bytes, self.num_bits, self.value)
  }
}

impl WalkNode for UintLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    Some(match self.storage_bytes {
      1 => SimpleValue::Uint8(self.value as u8),
      2 => SimpleValue::Uint16(self.value as u16),
      4 => SimpleValue::Uint32(self.value as u32),
      _ => SimpleValue::Uint64(self.value),
    })
  }
}

pub struct F32Leaf {
  pub erd: &'static dyn ElementRuntimeData,
  pub endian: DataEndian,
  pub value: f32,
}

impl F32Leaf {
  pub fn new(erd: &'static dyn ElementRuntimeData, endian: DataEndian) -> Self {
    Self { erd, endian, value: 0.0 }
  }
}

impl Infoset for F32Leaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.value = pstate.read_f32(self.endian)?;
    Ok(())
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    ustate.write_f32(self.endian, self.value)
  }
}

impl WalkNode for F32Leaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    Some(SimpleValue::Float(self.value))
  }
}

pub struct F64Leaf {
  pub erd: &'static dyn ElementRuntimeData,
  pub endian: DataEndian,
  pub value: f64,
}

impl F64Leaf {
  pub fn new(erd: &'static dyn ElementRuntimeData, endian: DataEndian) -> Self {
    Self { erd, endian, value: 0.0 }
  }
}

impl Infoset for F64Leaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.value = pstate.read_f64(self.endian)?;
    Ok(())
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    ustate.write_f64(self.endian, self.value)
  }
}

impl WalkNode for F64Leaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    Some(SimpleValue::Double(self.value))
  }
}

pub struct BoolLeaf {
  pub erd: &'static dyn ElementRuntimeData,
  pub endian: DataEndian,
  pub num_bits: u32,
  pub true_rep: Option<u32>,
  pub false_rep: u32,
  pub value: bool,
}

impl BoolLeaf {
  pub fn new(erd: &'static dyn ElementRuntimeData, endian: DataEndian, num_bits: u32, true_rep: Option<u32>, false_rep: u32) -> Self {
    Self { erd, endian, num_bits, true_rep, false_rep, value: false }
  }
}

impl Infoset for BoolLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.value = pstate.read_bool(self.endian, self.num_bits, self.true_rep, self.false_rep)?;
    Ok(())
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    let true_rep = self.true_rep.unwrap_or(1);
    ustate.write_bool(self.endian, self.num_bits, true_rep, self.false_rep, self.value)
  }
}

impl WalkNode for BoolLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    Some(SimpleValue::Boolean(self.value))
  }
}

pub struct HexBinaryLeaf {
  pub erd: &'static dyn ElementRuntimeData,
  pub hex: HexBinary,
}

impl HexBinaryLeaf {
  pub fn fixed(erd: &'static dyn ElementRuntimeData, bytes: Vec<u8>) -> Self {
    Self { erd, hex: HexBinary::fixed(bytes) }
  }

  pub fn dynamic(erd: &'static dyn ElementRuntimeData) -> Self {
    Self { erd, hex: HexBinary::dynamic() }
  }
}

impl HexBinaryLeaf {
  /// Length-prefixed hexBinary (§4.4): the caller has already parsed the
  /// length field into `num_bytes`. Frees any buffer a previous parse of
  /// this same field left behind (the hexBinary-lifetime open question in
  /// spec.md §9: free-before-alloc, never after), then allocates and reads
  /// exactly `num_bytes` opaque bytes.
  pub fn parse_prefixed<R: Read>(&mut self, pstate: &mut PState<'_, R>, num_bytes: usize) -> Result<(), RuntimeError> {
    debug_assert!(self.hex.dynamic, "parse_prefixed is only for dynamically-sized hexBinary fields");
    self.hex.reset();
    pstate.alloc_hex_binary(&mut self.hex, num_bytes)?;
    pstate.parse_hex_binary(&mut self.hex)
  }

  /// Writes the length prefix (as an unsigned integer of the given
  /// endianness/width) followed by the opaque bytes themselves.
  pub fn unparse_prefixed<W: Write>(
    &self,
    ustate: &mut UState<'_, W>,
    length_endian: DataEndian,
    length_storage_bytes: usize,
    length_num_bits: u32,
  ) -> Result<(), RuntimeError> {
    ustate.write_uint(length_endian, length_storage_bytes, length_num_bits, self.hex.bytes.len() as u64)?;
    ustate.unparse_hex_binary(&self.hex)
  }
}

impl Infoset for HexBinaryLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  /// Only meaningful for fixed-size hexBinary fields, whose inline storage
  /// already has its final length: `reset()` is then a no-op, and the read
  /// fills the schema-declared byte count directly. A dynamically-sized
  /// field's length comes from a separately-parsed sibling element, so it
  /// goes through [`Self::parse_prefixed`] instead, never through this
  /// generic entry point.
  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    debug_assert!(!self.hex.dynamic, "dynamically-sized hexBinary is parsed via parse_prefixed, not parse_self");
    pstate.parse_hex_binary(&mut self.hex)
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    ustate.unparse_hex_binary(&self.hex)
  }
}

impl WalkNode for HexBinaryLeaf {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    self.erd
  }

  fn as_simple(&self) -> Option<SimpleValue<'_>> {
    Some(SimpleValue::HexBinary(&self.hex.bytes))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::erd::{LeafErd, NamedQName, TypeCode};

  static V_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("v"), type_code: TypeCode::Int32 };
  static HEX_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("h"), type_code: TypeCode::HexBinary };

  #[test]
  fn int_leaf_round_trips_and_renders_by_storage_width() {
    let mut out = Vec::new();
    {
      let mut leaf = IntLeaf::new(&V_ERD, DataEndian::Big, 2, 16);
      leaf.value = -100;
      let mut ustate = UState::new(&mut out);
      leaf.unparse_self(&mut ustate).unwrap();
      ustate.flush_fragment_byte(0);
      assert_eq!(leaf.as_simple(), Some(SimpleValue::Int16(-100)));
    }
    let mut input: &[u8] = &out;
    let mut pstate = PState::new(&mut input);
    let mut leaf = IntLeaf::new(&V_ERD, DataEndian::Big, 2, 16);
    leaf.parse_self(&mut pstate).unwrap();
    assert_eq!(leaf.value, -100);
  }

  #[test]
  fn bool_leaf_round_trips_with_an_explicit_true_rep() {
    let mut out = Vec::new();
    {
      let mut leaf = BoolLeaf::new(&V_ERD, DataEndian::Big, 16, Some(16), 0);
      leaf.value = true;
      let mut ustate = UState::new(&mut out);
      leaf.unparse_self(&mut ustate).unwrap();
      ustate.flush_fragment_byte(0);
    }
    assert_eq!(out, vec![0x00, 0x10]);
    let mut input: &[u8] = &out;
    let mut pstate = PState::new(&mut input);
    let mut leaf = BoolLeaf::new(&V_ERD, DataEndian::Big, 16, Some(16), 0);
    leaf.parse_self(&mut pstate).unwrap();
    assert!(leaf.value);
  }

  #[test]
  fn fixed_hex_binary_leaf_round_trips_through_parse_self() {
    let mut out = Vec::new();
    {
      let leaf = HexBinaryLeaf::fixed(&HEX_ERD, vec![0xDE, 0xAD, 0xBE, 0xEF]);
      let mut ustate = UState::new(&mut out);
      leaf.unparse_self(&mut ustate).unwrap();
      ustate.flush_fragment_byte(0);
    }
    assert_eq!(out, vec![0xDE, 0xAD, 0xBE, 0xEF]);

    let mut input: &[u8] = &out;
    let mut pstate = PState::new(&mut input);
    let mut leaf = HexBinaryLeaf::fixed(&HEX_ERD, vec![0, 0, 0, 0]);
    leaf.parse_self(&mut pstate).unwrap();
    assert_eq!(leaf.hex.bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
  }

  #[test]
  fn dynamic_hex_binary_leaf_round_trips_through_its_length_prefix() {
    let mut out = Vec::new();
    {
      let mut leaf = HexBinaryLeaf::dynamic(&HEX_ERD);
      leaf.hex.bytes = vec![0x01, 0x02, 0x03];
      let mut ustate = UState::new(&mut out);
      leaf.unparse_prefixed(&mut ustate, DataEndian::Big, 4, 32).unwrap();
      ustate.flush_fragment_byte(0);
    }
    assert_eq!(out, vec![0x00, 0x00, 0x00, 0x03, 0x01, 0x02, 0x03]);

    let mut input: &[u8] = &out;
    let mut pstate = PState::new(&mut input);
    let len = pstate.read_uint(DataEndian::Big, 4, 32).unwrap() as usize;
    let mut leaf = HexBinaryLeaf::dynamic(&HEX_ERD);
    leaf.parse_prefixed(&mut pstate, len).unwrap();
    assert_eq!(leaf.hex.bytes, vec![0x01, 0x02, 0x03]);
  }

  #[test]
  fn dynamic_hex_binary_leaf_frees_its_prior_buffer_on_a_second_parse() {
    let mut first: &[u8] = &[0xAA, 0xBB, 0xCC, 0xDD];
    let mut pstate = PState::new(&mut first);
    let mut leaf = HexBinaryLeaf::dynamic(&HEX_ERD);
    leaf.parse_prefixed(&mut pstate, 4).unwrap();
    assert_eq!(leaf.hex.bytes, vec![0xAA, 0xBB, 0xCC, 0xDD]);

    let mut second: &[u8] = &[0x11, 0x22];
    let mut pstate = PState::new(&mut second);
    leaf.parse_prefixed(&mut pstate, 2).unwrap();
    assert_eq!(leaf.hex.bytes, vec![0x11, 0x22]);
  }
}
