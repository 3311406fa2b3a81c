//! The `{code, msg, data}` envelope and the padding strategy that builds it.
//!
//! Only the enveloped writers ([`Json`](crate::Json), [`JsonP`](crate::JsonP),
//! [`Xml`](crate::Xml) and [`Negotiated`](crate::Negotiated)) pad their payload;
//! [`Text`](crate::Text) and [`Html`](crate::Html) are written verbatim.

use crate::RetCode;
use serde::Serialize;
use serde_json::{Map, Value};

pub const CODE_KEY: &str = "code";
pub const MSG_KEY: &str = "msg";
pub const DATA_KEY: &str = "data";

/// An ordered string-keyed map that always holds `code` and `msg`.
///
/// Custom [`Padding`] implementations may add keys with [`Envelope::insert`],
/// but can not drop the two mandatory ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope {
    inner: Map<String, Value>,
}

impl Envelope {
    /// Creates an envelope holding only `code` and `msg` of `rc`.
    pub fn new(rc: &RetCode) -> Self {
        let mut inner = Map::with_capacity(3);
        inner.insert(CODE_KEY.to_owned(), Value::from(rc.code()));
        inner.insert(MSG_KEY.to_owned(), Value::from(rc.msg()));
        Self { inner }
    }

    /// Builds an envelope and attaches `data` when present.
    pub fn with_data(rc: &RetCode, data: Option<Value>) -> Self {
        let mut envelope = Self::new(rc);
        if let Some(data) = data {
            envelope.insert(DATA_KEY, data);
        }
        envelope
    }

    /// The `code` entry, `None` if a custom padding left it out or made it a non-string.
    pub fn code(&self) -> Option<&str> {
        self.inner.get(CODE_KEY).and_then(Value::as_str)
    }

    /// The `msg` entry, see [`code`](Self::code).
    pub fn msg(&self) -> Option<&str> {
        self.inner.get(MSG_KEY).and_then(Value::as_str)
    }

    /// The payload, `None` when the envelope has no `data` key.
    pub fn data(&self) -> Option<&Value> {
        self.inner.get(DATA_KEY)
    }

    /// Looks up any entry, including ones added by a custom padding.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Inserts an extra entry, returning the previous value of that key.
    ///
    /// `code` and `msg` can be overwritten but never removed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.insert(key.into(), value.into())
    }

    /// Entries in the order they are written.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }

    /// Borrows the underlying map, in insertion order.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    /// Unwraps the ordered map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.inner
    }
}

impl From<Envelope> for Value {
    fn from(envelope: Envelope) -> Self {
        Value::Object(envelope.inner)
    }
}

/// Strategy that turns a result code and an optional payload into an [`Envelope`].
///
/// Any `Fn(&RetCode, Option<Value>) -> Envelope` closure is a padding, so a custom
/// layout is usually a one-liner passed to
/// [`RspConfigBuilder::padding`](crate::RspConfigBuilder::padding).
pub trait Padding: Send + Sync {
    fn pad(&self, rc: &RetCode, data: Option<Value>) -> Envelope;
}

impl<F> Padding for F
where
    F: Fn(&RetCode, Option<Value>) -> Envelope + Send + Sync,
{
    fn pad(&self, rc: &RetCode, data: Option<Value>) -> Envelope {
        (self)(rc, data)
    }
}

/// `{code, msg, data?}`, omitting `data` when the payload is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPadding;

impl Padding for DefaultPadding {
    fn pad(&self, rc: &RetCode, data: Option<Value>) -> Envelope {
        Envelope::with_data(rc, data)
    }
}
