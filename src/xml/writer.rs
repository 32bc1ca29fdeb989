//! Serializes a walked infoset as XML text.
//!
//! Grounded on `xml_writer.c`'s `visitStartComplex`/`visitEndComplex`/
//! `visitSimpleElem` implementations and on `quick-xml` 0.23's own call
//! shapes: `BytesStart::borrowed_name` + `push_attribute`, `write_event`
//! with `.to_borrowed()`/`.to_end()`, `Writer::new_with_indent`.

use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::erd::ElementRuntimeData;
use crate::walker::{SimpleValue, VisitEventHandler};

use super::XmlError;

/// Writes one infoset as an indented XML document.
///
/// Keeps the open tag on `open_tags` between `visit_start_complex` and its
/// matching `visit_end_complex` so the end event can be built with
/// `to_end()`, avoiding re-deriving a fresh `BytesEnd` from the ERD's
/// name a second time.
pub struct XmlInfosetWriter<W: Write> {
  inner: Writer<W>,
  open_tags: Vec<BytesStart<'static>>,
}

impl<W: Write> XmlInfosetWriter<W> {
  pub fn new(sink: W) -> Self {
    Self { inner: Writer::new_with_indent(sink, b' ', 2), open_tags: Vec::new() }
  }

  pub fn into_inner(self) -> W {
    self.inner.into_inner()
  }

  fn start_tag(&mut self, erd: &'static dyn ElementRuntimeData) -> BytesStart<'static> {
    let name = erd.named_qname().rendered_name();
    let mut tag = BytesStart::owned_name(name.into_bytes());
    if let (Some(attr), Some(ns)) = (erd.named_qname().xmlns_attr_name(), erd.named_qname().ns) {
      tag.push_attribute((attr.as_str(), ns));
    }
    tag
  }
}

impl<W: Write> VisitEventHandler for XmlInfosetWriter<W> {
  type Err = XmlError;

  fn visit_start_document(&mut self) -> Result<(), XmlError> {
    self.inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(())
  }

  fn visit_start_complex(&mut self, erd: &'static dyn ElementRuntimeData) -> Result<(), XmlError> {
    let tag = self.start_tag(erd);
    self.inner.write_event(Event::Start(tag.to_borrowed()))?;
    self.open_tags.push(tag);
    Ok(())
  }

  fn visit_end_complex(&mut self, _erd: &'static dyn ElementRuntimeData) -> Result<(), XmlError> {
    let tag = self.open_tags.pop().expect("visit_end_complex always follows a matching visit_start_complex");
    self.inner.write_event(Event::End(tag.to_end()))?;
    Ok(())
  }

  fn visit_simple_elem(&mut self, erd: &'static dyn ElementRuntimeData, value: SimpleValue<'_>) -> Result<(), XmlError> {
    let tag = self.start_tag(erd);
    self.inner.write_event(Event::Start(tag.to_borrowed()))?;
    let text = render_simple_value(value);
    self.inner.write_event(Event::Text(BytesText::from_plain_str(&text)))?;
    self.inner.write_event(Event::End(tag.to_end()))?;
    Ok(())
  }
}


fn render_simple_value(value: SimpleValue<'_>) -> String {
  match value {
    SimpleValue::Boolean(v) => v.to_string(),
    SimpleValue::Float(v) => v.to_string(),
    SimpleValue::Double(v) => v.to_string(),
    SimpleValue::HexBinary(bytes) => bytes.iter().map(|b| format!("{b:02X}")).collect(),
    SimpleValue::Int8(v) => v.to_string(),
    SimpleValue::Int16(v) => v.to_string(),
    SimpleValue::Int32(v) => v.to_string(),
    SimpleValue::Int64(v) => v.to_string(),
    SimpleValue::Uint8(v) => v.to_string(),
    SimpleValue::Uint16(v) => v.to_string(),
    SimpleValue::Uint32(v) => v.to_string(),
    SimpleValue::Uint64(v) => v.to_string(),
  }
}
