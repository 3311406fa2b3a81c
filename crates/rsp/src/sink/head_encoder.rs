//! Serializes a [`ResponseHead`] into an HTTP/1.x status line and header block.

use crate::sink::ResponseHead;
use bytes::{BufMut, BytesMut};
use http::{header, HeaderValue, Version};
use std::io;
use std::io::{ErrorKind, Write};
use tokio_util::codec::Encoder;
use tracing::error;

const INIT_HEADER_SIZE: usize = 1024;

/// Encodes the head of a response whose body length is known up front.
///
/// Any `Content-Length` already present is overwritten with the given length and
/// `Transfer-Encoding` is removed, the body always follows the head in one piece.
#[derive(Debug, Default)]
pub(crate) struct HeadEncoder;

impl Encoder<(&mut ResponseHead, usize)> for HeadEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: (&mut ResponseHead, usize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, body_len) = item;

        let version = match head.version() {
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_10 => "HTTP/1.0",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported));
            }
        };

        dst.reserve(INIT_HEADER_SIZE);
        let status = head.status();
        write!(FastWrite(dst), "{} {} {}\r\n", version, status.as_str(), status.canonical_reason().unwrap_or(""))?;

        let headers = head.headers_mut();
        headers.remove(header::TRANSFER_ENCODING);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));

        for (header_name, header_value) in headers.iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_encode_head() {
        let mut head = ResponseHead::default();
        *head.status_mut() = StatusCode::NOT_FOUND;
        head.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        head.headers_mut().insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));

        let mut dst = BytesMut::new();
        HeadEncoder.encode((&mut head, 10), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"HTTP/1.1 404 Not Found\r\ncontent-type: text/plain\r\ncontent-length: 10\r\n\r\n"[..]);
    }

    #[test]
    fn test_encode_http_10() {
        let mut head = ResponseHead::default();
        *head.version_mut() = Version::HTTP_10;

        let mut dst = BytesMut::new();
        HeadEncoder.encode((&mut head, 0), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"HTTP/1.0 200 OK\r\ncontent-length: 0\r\n\r\n"[..]);
    }

    #[test]
    fn test_unsupported_version() {
        let mut head = ResponseHead::default();
        *head.version_mut() = Version::HTTP_2;

        let err = HeadEncoder.encode((&mut head, 0), &mut BytesMut::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
