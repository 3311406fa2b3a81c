//! Format writers.
//!
//! Two families share the same write path:
//!
//! - [`RawWriter`]: [`Text`] and [`Html`], written verbatim
//! - [`ApiWriter`]: [`Json`], [`JsonP`], [`Xml`] and [`Negotiated`], whose payload is
//!   padded into an [`Envelope`] first
//!
//! Every writer sets its `Content-Type` before encoding, then writes the whole body
//! with a single [`ResponseSink::write`]. A writer is meant to be used once per
//! response; sending twice into the same sink writes the body twice.

mod json;
mod negotiated;
mod text;
mod xml;

pub use json::{Callback, Json, JsonP};
pub use negotiated::{ApiFormat, Negotiated};
pub use text::{Html, Text};
pub use xml::{Xml, XML_ROOT_TAG};

use crate::content_type::ContentType;
use crate::envelope::Envelope;
use crate::error::WriteFailed;
use crate::sink::ResponseSink;
use crate::{RetCode, RspConfig};
use async_trait::async_trait;
use bytes::Bytes;
use http::header;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

async fn write_body<S>(sink: &mut S, content_type: ContentType, body: Result<Bytes, WriteFailed>) -> Result<(), WriteFailed>
where
    S: ResponseSink + ?Sized,
{
    sink.headers_mut().insert(header::CONTENT_TYPE, content_type.header_value());
    let body = body?;
    trace!(content_type = content_type.as_str(), size = body.len(), "send response body");
    sink.write(body).await.map_err(WriteFailed::io)
}

/// A writer that sends its string as the body, without any envelope.
#[async_trait]
pub trait RawWriter: Sync {
    fn content_type(&self) -> ContentType;

    fn as_str(&self) -> &str;

    async fn send<S>(&self, sink: &mut S) -> Result<(), WriteFailed>
    where
        S: ResponseSink + ?Sized,
    {
        let body = Bytes::copy_from_slice(self.as_str().as_bytes());
        write_body(sink, self.content_type(), Ok(body)).await
    }
}

/// A writer that wraps its payload into an [`Envelope`] before encoding it.
///
/// `success` pads with the configured success code, `failed` with the writer's own
/// [`RetCode`]. The plain variants read the process-wide [`RspConfig::global`], the
/// `_with` variants take the config explicitly.
#[async_trait]
pub trait ApiWriter: Sync {
    fn content_type(&self) -> ContentType;

    fn ret_code(&self) -> &RetCode;

    /// The payload as a JSON value, `None` when absent.
    fn payload(&self) -> Result<Option<Value>, WriteFailed>;

    fn encode(&self, envelope: &Envelope) -> Result<Bytes, WriteFailed>;

    /// Encodes an already padded envelope and writes it.
    async fn send<S>(&self, sink: &mut S, envelope: &Envelope) -> Result<(), WriteFailed>
    where
        S: ResponseSink + ?Sized,
    {
        let content_type = self.content_type();
        write_body(sink, content_type, self.encode(envelope)).await
    }

    async fn success<S>(&self, sink: &mut S) -> Result<(), WriteFailed>
    where
        S: ResponseSink + ?Sized,
    {
        self.success_with(sink, RspConfig::global()).await
    }

    async fn failed<S>(&self, sink: &mut S) -> Result<(), WriteFailed>
    where
        S: ResponseSink + ?Sized,
    {
        self.failed_with(sink, RspConfig::global()).await
    }

    async fn success_with<S>(&self, sink: &mut S, config: &RspConfig) -> Result<(), WriteFailed>
    where
        S: ResponseSink + ?Sized,
    {
        let envelope = config.pad(config.success(), self.payload()?);
        self.send(sink, &envelope).await
    }

    async fn failed_with<S>(&self, sink: &mut S, config: &RspConfig) -> Result<(), WriteFailed>
    where
        S: ResponseSink + ?Sized,
    {
        let envelope = config.pad(self.ret_code(), self.payload()?);
        self.send(sink, &envelope).await
    }
}

/// Result code and optional payload shared by every enveloped writer.
#[derive(Debug, Clone)]
struct Api<T> {
    rc: RetCode,
    data: Option<T>,
}

impl<T: Serialize> Api<T> {
    fn payload(&self) -> Result<Option<Value>, WriteFailed> {
        self.data.as_ref().map(serde_json::to_value).transpose().map_err(WriteFailed::encode)
    }
}

impl<T> Default for Api<T> {
    fn default() -> Self {
        Self { rc: RetCode::SUCCESS, data: None }
    }
}
