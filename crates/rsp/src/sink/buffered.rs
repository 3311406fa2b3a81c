use crate::sink::{ResponseHead, ResponseSink};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;
use std::io;
use tracing::trace;

/// An in-memory sink, the bridge to `http`-based servers.
///
/// ```
/// use micro_rsp::{BufferedSink, RawWriter, Text};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut sink = BufferedSink::new();
/// Text::new("pong").send(&mut sink).await.unwrap();
///
/// let response = sink.into_response();
/// assert_eq!(response.status(), 200);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct BufferedSink {
    head: ResponseHead,
    body: BytesMut,
    closed: bool,
}

impl BufferedSink {
    /// An empty `200 OK` response, open for writing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The status set so far, `200 OK` by default.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    /// The headers set so far.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    /// Every byte written so far.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Marks the sink as closed; every later write fails with [`io::ErrorKind::BrokenPipe`].
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Converts the recorded status, headers and body into an [`http::Response`].
    ///
    /// The body is a single [`Full`] frame, ready for any `http-body` based server.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let Self { head, body, .. } = self;
        head.map(|()| Full::new(body.freeze()))
    }
}

#[async_trait]
impl ResponseSink for BufferedSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.head.headers_mut()
    }

    fn set_status(&mut self, status: StatusCode) {
        *self.head.status_mut() = status;
    }

    async fn write(&mut self, body: Bytes) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "response sink is closed"));
        }

        trace!(size = body.len(), "buffer response body");
        self.body.put_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_into_response() {
        let mut sink = BufferedSink::new();
        sink.set_status(StatusCode::CREATED);
        sink.headers_mut().insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        sink.write(Bytes::from_static(b"hello ")).await.unwrap();
        sink.write(Bytes::from_static(b"world")).await.unwrap();

        assert_eq!(sink.body(), b"hello world");

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from_static(b"hello world"));
    }

    #[tokio::test]
    async fn test_closed_sink() {
        let mut sink = BufferedSink::new();
        sink.close();

        let err = sink.write(Bytes::from_static(b"lost")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(sink.body().is_empty());
    }
}
