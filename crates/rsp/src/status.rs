//! Plain-text error responses for the common client errors.
//!
//! Every helper sets the status, a `text/plain; charset=utf-8` content type, and
//! writes `msg` followed by a newline as the whole body. Unlike the format
//! writers, the I/O error of the sink is returned as is.

use crate::content_type::ContentType;
use crate::sink::ResponseSink;
use bytes::{BufMut, BytesMut};
use http::{header, StatusCode};
use std::io;

/// Writes an arbitrary status with `msg` as its plain-text body.
pub async fn respond<S>(sink: &mut S, status: StatusCode, msg: &str) -> io::Result<()>
where
    S: ResponseSink + ?Sized,
{
    sink.set_status(status);
    sink.headers_mut().insert(header::CONTENT_TYPE, ContentType::Text.header_value());

    let mut body = BytesMut::with_capacity(msg.len() + 1);
    body.put_slice(msg.as_bytes());
    body.put_u8(b'\n');
    sink.write(body.freeze()).await
}

/// 400, the request is invalid, usually one of its parameters.
pub async fn bad_request<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::BAD_REQUEST, msg).await
}

/// 401, the client is not authenticated.
pub async fn unauthorized<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::UNAUTHORIZED, msg).await
}

/// 403, the client is authenticated but may not access the resource.
pub async fn forbidden<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::FORBIDDEN, msg).await
}

/// 404
pub async fn not_found<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::NOT_FOUND, msg).await
}

/// 405, the resource exists but does not support the request method.
pub async fn method_not_allowed<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::METHOD_NOT_ALLOWED, msg).await
}

/// 406, none of the formats in the request `Accept` header can be produced.
pub async fn not_acceptable<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::NOT_ACCEPTABLE, msg).await
}

/// 408
pub async fn request_timeout<S: ResponseSink + ?Sized>(sink: &mut S, msg: &str) -> io::Result<()> {
    respond(sink, StatusCode::REQUEST_TIMEOUT, msg).await
}
