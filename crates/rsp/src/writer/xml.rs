use crate::content_type::ContentType;
use crate::envelope::Envelope;
use crate::error::WriteFailed;
use crate::writer::{Api, ApiWriter};
use crate::RetCode;
use bytes::Bytes;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use serde_json::{Map, Value};

/// Root element of every XML envelope.
pub const XML_ROOT_TAG: &str = "doc";

/// An `application/xml` enveloped response.
///
/// The envelope becomes the children of a `<doc>` root:
///
/// - objects become nested elements, one per key
/// - arrays repeat the element of their key once per item
/// - `null`, empty objects and empty arrays become empty elements
/// - strings, numbers and booleans become escaped text
///
/// Keys that are not valid XML element names, and text holding characters XML 1.0
/// forbids (most C0 controls), fail the encoding.
#[derive(Debug, Clone)]
pub struct Xml<T = Value> {
    api: Api<T>,
}

impl<T> Xml<T> {
    /// An XML response carrying `data` under `<data>`.
    pub fn new(data: T) -> Self {
        Self { api: Api { rc: RetCode::SUCCESS, data: Some(data) } }
    }

    /// An XML failure carrying `rc` and an optional payload.
    ///
    /// When `data` is `None` the document only holds `<code>` and `<msg>`.
    pub fn with_code(rc: RetCode, data: Option<T>) -> Self {
        Self { api: Api { rc, data } }
    }
}

impl Xml<Value> {
    /// A success response whose document only holds `<code>` and `<msg>`.
    pub fn empty() -> Self {
        Self { api: Api::default() }
    }

    /// An XML failure without payload.
    pub fn failure(rc: RetCode) -> Self {
        Self::with_code(rc, None)
    }
}

impl<T> ApiWriter for Xml<T>
where
    T: Serialize + Sync,
{
    #[inline]
    fn content_type(&self) -> ContentType {
        ContentType::Xml
    }

    #[inline]
    fn ret_code(&self) -> &RetCode {
        &self.api.rc
    }

    fn payload(&self) -> Result<Option<Value>, WriteFailed> {
        self.api.payload()
    }

    fn encode(&self, envelope: &Envelope) -> Result<Bytes, WriteFailed> {
        encode_map(XML_ROOT_TAG, envelope.as_map())
    }
}

pub(crate) fn encode_map(root: &str, map: &Map<String, Value>) -> Result<Bytes, WriteFailed> {
    let mut writer = Writer::new(Vec::with_capacity(256));
    write_map(&mut writer, root, map)?;
    Ok(Bytes::from(writer.into_inner()))
}

fn write_map(writer: &mut Writer<Vec<u8>>, tag: &str, map: &Map<String, Value>) -> Result<(), WriteFailed> {
    if map.is_empty() {
        return write_empty(writer, tag);
    }

    writer.write_event(Event::Start(BytesStart::new(tag))).map_err(WriteFailed::encode)?;
    for (key, value) in map {
        write_field(writer, key, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag))).map_err(WriteFailed::encode)?;
    Ok(())
}

fn write_field(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<(), WriteFailed> {
    if !is_xml_name(key) {
        return Err(WriteFailed::encode(format!("`{key}` is not a valid xml element name")));
    }

    match value {
        Value::Null => write_empty(writer, key),
        Value::Bool(b) => write_text(writer, key, if *b { "true" } else { "false" }),
        Value::Number(n) => write_text(writer, key, &n.to_string()),
        Value::String(s) => write_text(writer, key, s),
        Value::Array(items) if items.is_empty() => write_empty(writer, key),
        Value::Array(items) => items.iter().try_for_each(|item| write_field(writer, key, item)),
        Value::Object(map) => write_map(writer, key, map),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), WriteFailed> {
    if let Some(c) = text.chars().find(|c| !is_xml_char(*c)) {
        return Err(WriteFailed::encode(format!("character {:#06x} in `{tag}` is not allowed in xml", u32::from(c))));
    }

    writer.write_event(Event::Start(BytesStart::new(tag))).map_err(WriteFailed::encode)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(WriteFailed::encode)?;
    writer.write_event(Event::End(BytesEnd::new(tag))).map_err(WriteFailed::encode)?;
    Ok(())
}

fn write_empty(writer: &mut Writer<Vec<u8>>, tag: &str) -> Result<(), WriteFailed> {
    writer.write_event(Event::Empty(BytesStart::new(tag))).map_err(WriteFailed::encode)?;
    Ok(())
}

/// XML 1.0 `Char`; rust chars already exclude the surrogate block.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}

// the xml `Name` production, without `:` since namespaces are not declared
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => {}
        _ => return false,
    }
    chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}
