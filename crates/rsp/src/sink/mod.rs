//! The response sink every writer writes into.
//!
//! A sink is the live response of the host server: a header map, a status and a
//! byte stream. Two implementations are provided:
//!
//! - [`BufferedSink`]: keeps everything in memory and converts into an
//!   [`http::Response`], for servers built on the `http` crate types
//! - [`StreamSink`]: writes an HTTP/1.1 message onto any [`tokio::io::AsyncWrite`]

mod buffered;
mod head_encoder;
mod stream;

pub use buffered::BufferedSink;
pub use stream::StreamSink;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use std::io;

/// The header portion of a response, before any body is attached.
pub type ResponseHead = Response<()>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseSink: Send {
    /// Headers that will be sent with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn set_status(&mut self, status: StatusCode);

    /// Writes a body chunk. Writers call this once per response with the whole body.
    async fn write(&mut self, body: Bytes) -> io::Result<()>;
}
