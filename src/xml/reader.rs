//! Low-level XML token and text-to-value reading, for a schema's own
//! `read_xml` to drive element-by-element.
//!
//! Grounded on `xml_reader.c`'s `strtobool`/`strtodnum`/`strtofnum`/
//! `strtoinum`/`strtounum` and on a `read_event`/`Reader::from_reader`
//! loop style common to `quick-xml` consumers.

use std::io::BufRead;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::XmlError;

pub struct XmlInfosetReader<R: BufRead> {
  inner: Reader<R>,
  buf: Vec<u8>,
}

impl<R: BufRead> XmlInfosetReader<R> {
  pub fn new(source: R) -> Self {
    let mut inner = Reader::from_reader(source);
    inner.trim_text(true);
    Self { inner, buf: Vec::new() }
  }

  /// Reads the next start tag, verifying its local name matches
  /// `expected`.
  pub fn expect_start(&mut self, expected: &str) -> Result<(), XmlError> {
    loop {
      self.buf.clear();
      match self.inner.read_event(&mut self.buf)? {
        Event::Decl(_) => continue,
        Event::Start(ref e) | Event::Empty(ref e) => {
          let actual = std::str::from_utf8(e.name())?.to_string();
          return if actual == expected {
            Ok(())
          } else {
            Err(XmlError::UnexpectedElement(expected.to_string(), actual))
          };
        }
        Event::Eof => return Err(XmlError::UnexpectedElement(expected.to_string(), "<eof>".into())),
        _ => continue,
      }
    }
  }

  /// Reads the text content up to the next end tag, returning it (empty if
  /// the element was self-closing).
  pub fn read_text(&mut self) -> Result<String, XmlError> {
    self.buf.clear();
    match self.inner.read_event(&mut self.buf)? {
      Event::Text(e) => {
        let text = e.unescape_and_decode(&self.inner).map_err(XmlError::Xml)?;
        self.buf.clear();
        self.inner.read_event(&mut self.buf)?; // consume the matching End
        Ok(text)
      }
      Event::End(_) => Ok(String::new()),
      other => Err(XmlError::UnexpectedElement("text or end tag".into(), format!("{other:?}"))),
    }
  }

  /// Reads and discards the next end tag.
  pub fn expect_end(&mut self, expected: &str) -> Result<(), XmlError> {
    self.buf.clear();
    match self.inner.read_event(&mut self.buf)? {
      Event::End(ref e) => {
        let actual = std::str::from_utf8(e.name())?.to_string();
        if actual == expected {
          Ok(())
        } else {
          Err(XmlError::UnexpectedElement(format!("</{expected}>"), actual))
        }
      }
      other => Err(XmlError::UnexpectedElement(format!("</{expected}>"), format!("{other:?}"))),
    }
  }
}

/// `strtobool` (§6.3/xml_reader.c): accepts `"true"`/`"1"` and
/// `"false"`/`"0"` case-insensitively.
pub fn parse_bool_text(text: &str) -> Result<bool, XmlError> {
  match text.trim() {
    "true" | "1" | "True" | "TRUE" => Ok(true),
    "false" | "0" | "False" | "FALSE" => Ok(false),
    _ => Err(XmlError::StrToBool(text.to_string())),
  }
}

/// `strtoinum`/`strtounum`: empty text is `CLI_STRTONUM_EMPTY`, unparsable
/// text is `CLI_STRTONUM_NOT`, a value outside `T`'s range is
/// `CLI_STRTONUM_RANGE`.
pub fn parse_int_text<T>(text: &str, kind: &'static str) -> Result<T, XmlError>
where
  T: FromStr,
{
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return Err(XmlError::StrToNum(text.to_string(), kind));
  }
  trimmed.parse::<T>().map_err(|_| {
    if trimmed.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '+') {
      XmlError::StrToNumRange(text.to_string(), kind)
    } else {
      XmlError::StrToNum(text.to_string(), kind)
    }
  })
}

/// `strtodnum`/`strtofnum`.
pub fn parse_float_text<T>(text: &str, kind: &'static str) -> Result<T, XmlError>
where
  T: FromStr,
{
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return Err(XmlError::StrToNum(text.to_string(), kind));
  }
  trimmed.parse::<T>().map_err(|_| XmlError::StrToNum(text.to_string(), kind))
}

/// Parses hexBinary text (an even-length run of hex digit pairs).
pub fn parse_hex_binary_text(text: &str) -> Result<Vec<u8>, XmlError> {
  let trimmed = text.trim();
  if trimmed.len() % 2 != 0 {
    return Err(XmlError::StrToHexBinary(text.to_string()));
  }
  let mut out = Vec::with_capacity(trimmed.len() / 2);
  let bytes = trimmed.as_bytes();
  for pair in bytes.chunks(2) {
    let s = std::str::from_utf8(pair).map_err(|_| XmlError::StrToHexBinary(text.to_string()))?;
    let byte = u8::from_str_radix(s, 16).map_err(|_| XmlError::StrToHexBinary(text.to_string()))?;
    out.push(byte);
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_bool_text_accepts_true_false_and_digit_forms() {
    assert_eq!(parse_bool_text("true").unwrap(), true);
    assert_eq!(parse_bool_text("1").unwrap(), true);
    assert_eq!(parse_bool_text(" FALSE ").unwrap(), false);
    assert_eq!(parse_bool_text("0").unwrap(), false);
  }

  #[test]
  fn parse_bool_text_rejects_unrecognized_text() {
    assert!(parse_bool_text("yes").is_err());
  }

  #[test]
  fn parse_int_text_parses_and_rejects_empty_and_non_numeric() {
    let v: i32 = parse_int_text("42", "int32").unwrap();
    assert_eq!(v, 42);
    assert!(parse_int_text::<i32>("", "int32").is_err());
    assert!(parse_int_text::<i32>("abc", "int32").is_err());
    assert!(parse_int_text::<i8>("999", "int8").is_err());
  }

  #[test]
  fn parse_float_text_parses_and_rejects_empty() {
    let v: f64 = parse_float_text("3.5", "double").unwrap();
    assert_eq!(v, 3.5);
    assert!(parse_float_text::<f64>("", "double").is_err());
  }

  #[test]
  fn parse_hex_binary_text_decodes_pairs_and_rejects_odd_length() {
    assert_eq!(parse_hex_binary_text("DEAD").unwrap(), vec![0xDE, 0xAD]);
    assert!(parse_hex_binary_text("ABC").is_err());
  }

  #[test]
  fn reads_a_start_tag_text_and_end_tag_in_sequence() {
    let xml = b"<foo>hello</foo>" as &[u8];
    let mut reader = XmlInfosetReader::new(xml);
    reader.expect_start("foo").unwrap();
    let text = reader.read_text().unwrap();
    assert_eq!(text, "hello");
  }

  #[test]
  fn expect_start_errors_on_a_mismatched_tag_name() {
    let xml = b"<bar></bar>" as &[u8];
    let mut reader = XmlInfosetReader::new(xml);
    assert!(reader.expect_start("foo").is_err());
  }

  #[test]
  fn read_text_returns_empty_string_for_a_self_closed_element() {
    let xml = b"<foo></foo>" as &[u8];
    let mut reader = XmlInfosetReader::new(xml);
    reader.expect_start("foo").unwrap();
    assert_eq!(reader.read_text().unwrap(), "");
  }
}
