//! Scenario 5: a discriminated union (DFDL `xs:choice` with a
//! `dfdl:choiceDispatchKey`), nested one level inside its containing record.
//!
//! Grounded on `NestedUnion_ERD`/`NestedUnion__initChoice` in
//! `daffodil-codegen-c/.../test/examples/NestedUnion/generated_code.c`:
//! `initChoice`'s switch over the dispatch key becomes
//! [`crate::infoset::ChoiceHost::init_choice`]; the original's reuse of one
//! pre-allocated union storage slot per branch becomes an `Option` the
//! chosen variant is constructed into, since Rust has no direct analogue of
//! a C tagged union sharing storage across differently-typed branches.

use std::io::{BufRead, Read, Write};

use crate::bits::DataEndian;
use crate::erd::{ComplexErd, ElementRuntimeData, LeafErd, NamedQName, TypeCode};
use crate::error::RuntimeError;
use crate::infoset::{ChoiceHost, Infoset};
use crate::leaf::{F64Leaf, IntLeaf};
use crate::state::{PState, UState};
use crate::walker::WalkNode;
use crate::xml::reader::{parse_float_text, parse_int_text};
use crate::xml::{XmlError, XmlInfosetReader};

static TAG_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("tag"), type_code: TypeCode::Int32 };

static A_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("a"), type_code: TypeCode::Int32 };
static B_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("b"), type_code: TypeCode::Int32 };
static C_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("c"), type_code: TypeCode::Int32 };
static FOO_CHILDREN: [&dyn ElementRuntimeData; 3] = [&A_ERD, &B_ERD, &C_ERD];
static FOO_ERD: ComplexErd =
  ComplexErd { named_qname: NamedQName::unqualified("foo"), type_code: TypeCode::Complex, children: &FOO_CHILDREN };

static X_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("x"), type_code: TypeCode::Double };
static Y_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("y"), type_code: TypeCode::Double };
static Z_ERD: LeafErd = LeafErd { named_qname: NamedQName::unqualified("z"), type_code: TypeCode::Double };
static BAR_CHILDREN: [&dyn ElementRuntimeData; 3] = [&X_ERD, &Y_ERD, &Z_ERD];
static BAR_ERD: ComplexErd =
  ComplexErd { named_qname: NamedQName::unqualified("bar"), type_code: TypeCode::Complex, children: &BAR_CHILDREN };

static CHOICE_CHILDREN: [&dyn ElementRuntimeData; 2] = [&FOO_ERD, &BAR_ERD];
static CHOICE_ERD: ComplexErd =
  ComplexErd { named_qname: NamedQName::unqualified("branch"), type_code: TypeCode::Choice, children: &CHOICE_CHILDREN };

static ROOT_CHILDREN: [&dyn ElementRuntimeData; 2] = [&TAG_ERD, &CHOICE_ERD];
static ROOT_ERD: ComplexErd = ComplexErd {
  named_qname: NamedQName::unqualified("nested-union-record"),
  type_code: TypeCode::Complex,
  children: &ROOT_CHILDREN,
};

pub struct FooRecord {
  pub a: IntLeaf,
  pub b: IntLeaf,
  pub c: IntLeaf,
}

impl FooRecord {
  fn new() -> Self {
    Self {
      a: IntLeaf::new(&A_ERD, DataEndian::Big, 4, 32),
      b: IntLeaf::new(&B_ERD, DataEndian::Big, 4, 32),
      c: IntLeaf::new(&C_ERD, DataEndian::Big, 4, 32),
    }
  }
}

impl Infoset for FooRecord {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &FOO_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.a.parse_self(pstate)?;
    self.b.parse_self(pstate)?;
    self.c.parse_self(pstate)
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.a.unparse_self(ustate)?;
    self.b.unparse_self(ustate)?;
    self.c.unparse_self(ustate)
  }
}

impl WalkNode for FooRecord {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &FOO_ERD
  }

  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    Some(vec![&self.a, &self.b, &self.c])
  }
}

pub struct BarRecord {
  pub x: F64Leaf,
  pub y: F64Leaf,
  pub z: F64Leaf,
}

impl BarRecord {
  fn new() -> Self {
    Self {
      x: F64Leaf::new(&X_ERD, DataEndian::Big),
      y: F64Leaf::new(&Y_ERD, DataEndian::Big),
      z: F64Leaf::new(&Z_ERD, DataEndian::Big),
    }
  }
}

impl Infoset for BarRecord {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &BAR_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.x.parse_self(pstate)?;
    self.y.parse_self(pstate)?;
    self.z.parse_self(pstate)
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.x.unparse_self(ustate)?;
    self.y.unparse_self(ustate)?;
    self.z.unparse_self(ustate)
  }
}

impl WalkNode for BarRecord {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &BAR_ERD
  }

  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    Some(vec![&self.x, &self.y, &self.z])
  }
}

/// The live branch of `branch`, once `init_choice` has picked one.
pub enum UnionBranch {
  Foo(FooRecord),
  Bar(BarRecord),
}

impl Infoset for UnionBranch {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &CHOICE_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    match self {
      UnionBranch::Foo(foo) => foo.parse_self(pstate),
      UnionBranch::Bar(bar) => bar.parse_self(pstate),
    }
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    match self {
      UnionBranch::Foo(foo) => foo.unparse_self(ustate),
      UnionBranch::Bar(bar) => bar.unparse_self(ustate),
    }
  }
}

impl WalkNode for UnionBranch {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &CHOICE_ERD
  }

  fn as_choice(&self) -> Option<&dyn WalkNode> {
    Some(match self {
      UnionBranch::Foo(foo) => foo as &dyn WalkNode,
      UnionBranch::Bar(bar) => bar as &dyn WalkNode,
    })
  }
}

pub struct NestedUnion {
  pub tag: IntLeaf,
  pub branch: Option<UnionBranch>,
}

impl NestedUnion {
  pub fn new() -> Self {
    Self { tag: IntLeaf::new(&TAG_ERD, DataEndian::Big, 4, 32), branch: None }
  }
}

impl Default for NestedUnion {
  fn default() -> Self {
    Self::new()
  }
}

impl NestedUnion {
  /// Rebuilds a record from its XML shape. Like [`Infoset::parse_self`],
  /// the branch is selected from `tag` via [`ChoiceHost::init_choice`] —
  /// the XML element name (`foo` or `bar`) is only ever a consequence of
  /// that choice, never an independent source of truth for it.
  pub fn read_xml<R: BufRead>(reader: &mut XmlInfosetReader<R>) -> Result<Self, XmlError> {
    reader.expect_start("nested-union-record")?;
    reader.expect_start("tag")?;
    let tag_text = reader.read_text()?;
    let tag = parse_int_text::<i32>(&tag_text, "int32")? as i64;

    let mut record = Self::new();
    record.tag.value = tag;
    record.init_choice(tag)?;

    match record.branch.as_mut().expect("init_choice always sets a branch on success") {
      UnionBranch::Foo(foo) => {
        reader.expect_start("foo")?;
        reader.expect_start("a")?;
        let a = parse_int_text::<i32>(&reader.read_text()?, "int32")?;
        reader.expect_start("b")?;
        let b = parse_int_text::<i32>(&reader.read_text()?, "int32")?;
        reader.expect_start("c")?;
        let c = parse_int_text::<i32>(&reader.read_text()?, "int32")?;
        reader.expect_end("foo")?;
        foo.a.value = a as i64;
        foo.b.value = b as i64;
        foo.c.value = c as i64;
      }
      UnionBranch::Bar(bar) => {
        reader.expect_start("bar")?;
        reader.expect_start("x")?;
        let x = parse_float_text::<f64>(&reader.read_text()?, "double")?;
        reader.expect_start("y")?;
        let y = parse_float_text::<f64>(&reader.read_text()?, "double")?;
        reader.expect_start("z")?;
        let z = parse_float_text::<f64>(&reader.read_text()?, "double")?;
        reader.expect_end("bar")?;
        bar.x.value = x;
        bar.y.value = y;
        bar.z.value = z;
      }
    }

    reader.expect_end("nested-union-record")?;
    Ok(record)
  }
}

impl Infoset for NestedUnion {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn parse_self<R: Read>(&mut self, pstate: &mut PState<'_, R>) -> Result<(), RuntimeError> {
    self.tag.parse_self(pstate)?;
    self.init_choice(self.tag.value)?;
    match self.branch.as_mut().expect("init_choice always sets a branch on success") {
      UnionBranch::Foo(foo) => foo.parse_self(pstate),
      UnionBranch::Bar(bar) => bar.parse_self(pstate),
    }
  }

  fn unparse_self<W: Write>(&self, ustate: &mut UState<'_, W>) -> Result<(), RuntimeError> {
    self.tag.unparse_self(ustate)?;
    match self.branch.as_ref() {
      Some(UnionBranch::Foo(foo)) => foo.unparse_self(ustate),
      Some(UnionBranch::Bar(bar)) => bar.unparse_self(ustate),
      None => Err(RuntimeError::ChoiceKey(self.tag.value)),
    }
  }
}

impl ChoiceHost for NestedUnion {
  fn init_choice(&mut self, dispatch_key: i64) -> Result<(), RuntimeError> {
    self.branch = match dispatch_key {
      1 | 2 => Some(UnionBranch::Foo(FooRecord::new())),
      3 | 4 => Some(UnionBranch::Bar(BarRecord::new())),
      other => return Err(RuntimeError::ChoiceKey(other)),
    };
    Ok(())
  }
}

impl WalkNode for NestedUnion {
  fn erd(&self) -> &'static dyn ElementRuntimeData {
    &ROOT_ERD
  }

  fn as_complex(&self) -> Option<Vec<&dyn WalkNode>> {
    let mut children: Vec<&dyn WalkNode> = vec![&self.tag];
    if let Some(branch) = &self.branch {
      children.push(branch);
    }
    Some(children)
  }
}
