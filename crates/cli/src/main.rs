//! `dfdl`: parses a binary DFDL-conformant document into its XML infoset
//! representation, or unparses that XML representation back to binary,
//! against one of the worked-example schemas `dfdl-runtime` ships.
//!
//! Grounded on a clap-derived `Args`/`Format` CLI shape with an
//! `Input`/`Output` split for file-vs-stdio sources: a schema compiler's
//! own CLI would generate one pair of subcommands per schema it compiled,
//! rather than a `--schema` flag picking among a fixed set — this flag
//! stands in for that code generation step.

use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::warn;

use dfdl_runtime::generated::{
  fixed_value::FixedValue, mixed_endian::MixedEndian, nested_union::NestedUnion, signed17::Signed17,
  simple_byte::SimpleByte, variable_array::VariableArray,
};
use dfdl_runtime::state::{parse_data, unparse_infoset, PState, UState};
use dfdl_runtime::walker::walk_infoset;
use dfdl_runtime::xml::{XmlError, XmlInfosetReader, XmlInfosetWriter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Schema {
  SimpleByte,
  MixedEndian,
  Signed17,
  VariableArray,
  NestedUnion,
  FixedValue,
}

/// The infoset representation a `parse`/`unparse` run converts to/from.
/// Only `xml` is implemented; the flag exists because a real
/// Daffodil-generated CLI accepts it even though most backends support just
/// the one representation their build was configured with.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InfosetType {
  Xml,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Parses a binary document into its XML infoset representation.
  Parse(StreamArgs),
  /// Unparses an XML infoset representation back into a binary document.
  Unparse(StreamArgs),
}

#[derive(Debug, clap::Args)]
struct StreamArgs {
  /// The worked-example schema to parse/unparse against.
  #[arg(short = 's', long, value_enum, default_value = "nested-union")]
  schema: Schema,
  /// The infoset representation to read/write on the non-binary side.
  #[arg(short = 'I', long, value_enum, default_value = "xml")]
  infoset_type: InfosetType,
  /// Input file (else read from stdin)
  #[arg(short, long, value_name = "FILE")]
  input: Option<PathBuf>,
  /// Output file (else write to stdout)
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,
}

impl StreamArgs {
  fn open_input(&self) -> Result<Box<dyn BufRead>, XmlError> {
    match &self.input {
      Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
      None => Ok(Box::new(BufReader::new(stdin()))),
    }
  }

  fn open_output(&self) -> Result<Box<dyn Write>, XmlError> {
    match &self.output {
      Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
      None => Ok(Box::new(BufWriter::new(stdout()))),
    }
  }
}

/// Parses `input` against `schema` and walks the resulting infoset out to
/// `output` as XML. Any soft diagnostics accumulated during the parse are
/// logged, not treated as failures (they never set `pstate.pu.error`).
fn run_parse(args: &StreamArgs) -> Result<(), XmlError> {
  let InfosetType::Xml = args.infoset_type;
  let mut input = args.open_input()?;
  let mut pstate = PState::new(&mut input);

  macro_rules! parse_and_walk {
    ($record_ty:ty) => {{
      let mut record = <$record_ty>::default();
      parse_data(&mut record, &mut pstate)?;
      for diagnostic in pstate.pu.diagnostics.iter() {
        warn!("{diagnostic}");
      }
      let mut output = args.open_output()?;
      let mut writer = XmlInfosetWriter::new(&mut output);
      walk_infoset(&record, &mut writer)?;
    }};
  }

  match args.schema {
    Schema::SimpleByte => parse_and_walk!(SimpleByte),
    Schema::MixedEndian => parse_and_walk!(MixedEndian),
    Schema::Signed17 => parse_and_walk!(Signed17),
    Schema::VariableArray => parse_and_walk!(VariableArray),
    Schema::NestedUnion => parse_and_walk!(NestedUnion),
    Schema::FixedValue => parse_and_walk!(FixedValue),
  }
  Ok(())
}

/// Reads an XML infoset of the given `schema`'s shape from `input` and
/// unparses it back to binary on `output`.
fn run_unparse(args: &StreamArgs) -> Result<(), XmlError> {
  let InfosetType::Xml = args.infoset_type;
  let input = args.open_input()?;
  let mut reader = XmlInfosetReader::new(input);
  let mut output = args.open_output()?;

  macro_rules! read_and_unparse {
    ($record_ty:ty) => {{
      let record = <$record_ty>::read_xml(&mut reader)?;
      let mut ustate = UState::new(&mut output);
      unparse_infoset(&record, &mut ustate)?;
    }};
  }

  match args.schema {
    Schema::SimpleByte => read_and_unparse!(SimpleByte),
    Schema::MixedEndian => read_and_unparse!(MixedEndian),
    Schema::Signed17 => read_and_unparse!(Signed17),
    Schema::VariableArray => read_and_unparse!(VariableArray),
    Schema::NestedUnion => read_and_unparse!(NestedUnion),
    Schema::FixedValue => read_and_unparse!(FixedValue),
  }
  Ok(())
}

fn main() -> Result<(), XmlError> {
  env_logger::init();
  let cli = Cli::parse();
  match &cli.command {
    Command::Parse(args) => run_parse(args),
    Command::Unparse(args) => run_unparse(args),
  }
}
