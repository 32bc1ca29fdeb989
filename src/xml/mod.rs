//! A concrete infoset-to-XML-text round trip: a [`writer::XmlInfosetWriter`]
//! that implements [`crate::walker::VisitEventHandler`] so any infoset can
//! be serialized with [`crate::walker::walk_infoset`], and a
//! [`reader::XmlInfosetReader`] offering the low-level token/value reading
//! generated code uses to rebuild an infoset from that same XML shape
//! before unparsing it back to binary.
//!
//! Grounded on `xml_writer.c`/`xml_reader.c` in
//! `daffodil-runtime2/.../libcli`, wired together the way
//! `daffodil_main.c` wires `XMLWriter`/`XMLReader` as `VisitEventHandler`
//! implementors around `walk_infoset`. Only the write side is generic over
//! the walker: the original has no generic "read-walk" either — its CLI
//! reads XML via hand-written, schema-specific call sequences that invoke
//! `xml_reader.c`'s text-to-value helpers directly, which is the shape
//! [`reader::XmlInfosetReader`] follows here, and which each
//! [`crate::generated`] module then calls from its own concrete
//! `read_xml`/`write_xml` pair, the same way a `QuickXmlReadWrite`-style
//! trait keeps `read_sub_elements_by_ref` and `write` as two
//! independently-shaped methods rather than one bidirectional visitor.

pub mod reader;
pub mod writer;

pub use reader::XmlInfosetReader;
pub use writer::XmlInfosetWriter;

use quick_error::quick_error;

use crate::error::RuntimeError;

quick_error! {
  /// Errors from the XML adapters: the runtime's own [`RuntimeError`]
  /// band, `quick-xml`/IO/UTF-8 failures, and the CLI-facing text
  /// conversion errors from `xml_reader.c`'s `strtobool`/`strtonum` family.
  #[derive(Debug)]
  pub enum XmlError {
    Runtime(err: RuntimeError) {
      from()
      display("{}", err)
    }
    Xml(err: quick_xml::Error) {
      from()
      display("{}", err)
    }
    Io(err: std::io::Error) {
      from()
      display("{}", err)
    }
    Utf8(err: std::str::Utf8Error) {
      from()
      display("{}", err)
    }
    /// `CLI_UNEXPECTED_ELEMENT`: the next start tag's name did not match
    /// what the schema-specific reader expected.
    UnexpectedElement(expected: String, actual: String) {
      display("expected element '{}', found '{}'", expected, actual)
    }
    /// `CLI_STRTOBOOL`: text matched neither a true nor a false representation.
    StrToBool(text: String) {
      display("'{}' is not a valid boolean", text)
    }
    /// `CLI_STRTONUM_EMPTY`/`CLI_STRTONUM_NOT`/`CLI_STRTOD_ERRNO`: text was
    /// empty, non-numeric, or otherwise unparsable as `kind`.
    StrToNum(text: String, kind: &'static str) {
      display("'{}' is not a valid {}", text, kind)
    }
    /// `CLI_STRTONUM_RANGE`: text parsed but fell outside the target
    /// integer type's range.
    StrToNumRange(text: String, kind: &'static str) {
      display("'{}' is out of range for {}", text, kind)
    }
    /// hexBinary text had an odd number of hex digits or a non-hex character.
    StrToHexBinary(text: String) {
      display("'{}' is not valid hexBinary text", text)
    }
  }
}
