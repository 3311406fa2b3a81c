use crate::sink::head_encoder::HeadEncoder;
use crate::sink::{ResponseHead, ResponseSink};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderMap, StatusCode, Version};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

/// Writes a complete HTTP/1.x response onto an [`AsyncWrite`].
///
/// The first [`write`](ResponseSink::write) commits the response: the status
/// line and headers are encoded with a `Content-Length` equal to the chunk
/// being written, followed by the chunk itself, then the writer is flushed.
/// Once committed, status and header changes can no longer reach the client
/// and are dropped with a warning.
#[derive(Debug)]
pub struct StreamSink<W> {
    writer: W,
    head: ResponseHead,
    buffer: BytesMut,
    encoder: HeadEncoder,
    committed: bool,
}

impl<W> StreamSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Answers with HTTP/1.1.
    pub fn new(writer: W) -> Self {
        Self::with_version(writer, Version::HTTP_11)
    }

    /// Answers with the given protocol version, usually the one of the request.
    pub fn with_version(writer: W, version: Version) -> Self {
        let mut head = ResponseHead::default();
        *head.version_mut() = version;
        Self { writer, head, buffer: BytesMut::new(), encoder: HeadEncoder, committed: false }
    }

    /// Whether the head has already been written.
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// The underlying writer. Writing to it directly corrupts the response.
    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Gives the writer back, e.g. to shut the connection down.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> ResponseSink for StreamSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn headers_mut(&mut self) -> &mut HeaderMap {
        if self.committed {
            warn!("response head already written, header change will be ignored");
        }
        self.head.headers_mut()
    }

    fn set_status(&mut self, status: StatusCode) {
        if self.committed {
            warn!(%status, "response head already written, status change ignored");
            return;
        }
        *self.head.status_mut() = status;
    }

    async fn write(&mut self, body: Bytes) -> io::Result<()> {
        self.buffer.clear();

        if self.committed {
            warn!(size = body.len(), "superfluous write after the response was committed");
        } else {
            self.encoder.encode((&mut self.head, body.len()), &mut self.buffer)?;
            self.committed = true;
        }

        self.buffer.put_slice(&body);
        trace!(status = %self.head.status(), size = self.buffer.len(), "write response");

        self.writer.write_all(&self.buffer).await?;
        self.writer.flush().await
    }
}
