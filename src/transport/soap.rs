//! Minimal SOAP 1.1 envelope writing and reading.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::Cursor;

use crate::core::TransportError;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

fn xml_io(e: std::io::Error) -> TransportError {
    TransportError::Decode(format!("XML write error: {e}"))
}

/// Streaming writer for one request envelope.
pub struct EnvelopeWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl EnvelopeWriter {
    /// Open `<soap:Envelope>` and `<soap:Body>` with extra namespace
    /// declarations (`prefix`, `uri`).
    pub fn new(namespaces: &[(&str, &str)]) -> Result<Self, TransportError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        let mut envelope = BytesStart::new("soap:Envelope");
        envelope.push_attribute(("xmlns:soap", SOAP_ENV_NS));
        for (prefix, uri) in namespaces {
            envelope.push_attribute((format!("xmlns:{prefix}").as_str(), *uri));
        }
        writer
            .write_event(Event::Start(envelope))
            .map_err(xml_io)?;
        let mut this = Self { writer };
        this.start_element("soap:Body")?;
        Ok(this)
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, TransportError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, TransportError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// `<name>text</name>` with the text escaped.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, TransportError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Close body and envelope and return the document.
    pub fn finish(mut self) -> Result<String, TransportError> {
        self.end_element("soap:Body")?;
        self.end_element("soap:Envelope")?;
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| TransportError::Decode(format!("XML UTF-8 error: {e}")))
    }
}

/// Text of the first occurrence of each wanted element, keyed by local name.
///
/// An element that occurs but is empty maps to an empty string.
pub fn collect_text(xml: &str, wanted: &[&str]) -> Result<HashMap<String, String>, TransportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut found: HashMap<String, String> = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if wanted.contains(&name.as_str()) && !found.contains_key(&name) {
                    found.insert(name.clone(), String::new());
                    current = Some(name);
                } else {
                    current = None;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if wanted.contains(&name.as_str()) {
                    found.entry(name).or_default();
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(name) = &current {
                    let text = e.unescape().unwrap_or_default();
                    if let Some(slot) = found.get_mut(name) {
                        slot.push_str(&text);
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TransportError::Decode(format!("XML parse error: {e}"))),
            _ => {}
        }
    }
    Ok(found)
}

/// A SOAP fault in `xml`, if there is one.
pub fn fault(xml: &str) -> Result<Option<TransportError>, TransportError> {
    let fields = collect_text(xml, &["Fault", "faultcode", "faultstring"])?;
    if !fields.contains_key("Fault") {
        return Ok(None);
    }
    let code = fields
        .get("faultcode")
        .cloned()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "soap:Server".to_string());
    let message = fields.get("faultstring").cloned().filter(|m| !m.is_empty());
    Ok(Some(TransportError::Fault { code, message }))
}
