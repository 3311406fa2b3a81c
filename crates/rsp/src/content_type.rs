//! The fixed `Content-Type` of every writer.

use http::HeaderValue;

/// One entry of the MIME table; every writer maps to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
    Json,
    JsonP,
    Xml,
}

impl ContentType {
    /// The full `Content-Type` value, charset included.
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentType::Text | ContentType::JsonP => "text/plain; charset=utf-8",
            ContentType::Html => "text/html; charset=utf-8",
            ContentType::Json => "application/json; charset=utf-8",
            ContentType::Xml => "application/xml; charset=utf-8",
        }
    }

    /// [`as_str`](Self::as_str) as a ready to insert header value.
    #[inline]
    pub fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}
