use crate::content_type::ContentType;
use crate::writer::RawWriter;
use std::borrow::Cow;

/// A `text/plain` body, written as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    data: Cow<'static, str>,
}

impl Text {
    /// Wraps `data`, borrowed `&'static str` or owned `String`.
    pub fn new(data: impl Into<Cow<'static, str>>) -> Self {
        Self { data: data.into() }
    }
}

impl RawWriter for Text {
    #[inline]
    fn content_type(&self) -> ContentType {
        ContentType::Text
    }

    #[inline]
    fn as_str(&self) -> &str {
        &self.data
    }
}

/// A `text/html` body, written as is. No escaping is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Html {
    data: Cow<'static, str>,
}

impl Html {
    /// Wraps `data`; the markup is written as is, nothing is escaped.
    pub fn new(data: impl Into<Cow<'static, str>>) -> Self {
        Self { data: data.into() }
    }
}

impl RawWriter for Html {
    #[inline]
    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    #[inline]
    fn as_str(&self) -> &str {
        &self.data
    }
}
