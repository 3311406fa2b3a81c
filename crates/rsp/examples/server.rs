//! A tiny one-request-per-connection server answering with every writer.
//!
//! try:
//!   curl -i localhost:8080/user/5
//!   curl -i -H 'accept: application/xml' localhost:8080/user/5
//!   curl -i 'localhost:8080/user/5?callback=render'
//!   curl -i localhost:8080/user/404
//!   curl -i localhost:8080/hello

use bytes::BytesMut;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Version};
use micro_rsp::{status, ApiFormat, ApiWriter, Callback, Html, JsonP, Negotiated, RawWriter, ResponseSink, RetCode, RspConfig, StreamSink, Text};
use serde::Serialize;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const MAX_HEAD_SIZE: usize = 8 * 1024;
const MAX_HEADERS: usize = 32;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

const USER_NOT_FOUND: RetCode = RetCode::from_static("1404", "user not found");

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
    roles: Vec<&'static str>,
}

struct Request {
    method: Method,
    path: String,
    query: String,
    version: Version,
    headers: HeaderMap,
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = RspConfig::builder().success(RetCode::from_static("0", "OK")).build().install() {
        error!(cause = %e, "install response config error");
        return;
    }

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        tokio::spawn(async move {
            match serve(tcp_stream).await {
                Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                Err(e) => error!(%remote_addr, cause = %e, "failed to answer, connection shutdown"),
            }
        });
    }
}

async fn serve(mut tcp_stream: TcpStream) -> io::Result<()> {
    let head = tokio::time::timeout(READ_TIMEOUT, read_head(&mut tcp_stream)).await;
    let version = match &head {
        Ok(Ok(request)) => request.version,
        _ => Version::HTTP_11,
    };

    let mut sink = StreamSink::with_version(&mut tcp_stream, version);
    sink.headers_mut().insert(header::CONNECTION, HeaderValue::from_static("close"));

    match head {
        Err(_elapsed) => status::request_timeout(&mut sink, "request head not received in time").await,
        Ok(Err(e)) => status::bad_request(&mut sink, &e.to_string()).await,
        Ok(Ok(request)) => route(&request, &mut sink).await,
    }
}

async fn route(request: &Request, sink: &mut StreamSink<&mut TcpStream>) -> io::Result<()> {
    if request.method != Method::GET {
        return status::method_not_allowed(sink, "only GET is supported").await;
    }

    let result = match request.path.as_str() {
        "/hello" => Text::new("hello world").send(sink).await,
        "/" => Html::new("<h1>micro-rsp</h1><a href=\"/user/5\">user 5</a>").send(sink).await,
        path => match path.strip_prefix("/user/").and_then(|id| id.parse::<u64>().ok()) {
            Some(id) => return user(request, id, sink).await,
            None => return status::not_found(sink, "no such page").await,
        },
    };

    result.map_err(io::Error::other)
}

async fn user(request: &Request, id: u64, sink: &mut StreamSink<&mut TcpStream>) -> io::Result<()> {
    let user = (id != 404).then(|| User { id, name: format!("user-{id}"), roles: vec!["reader"] });

    let callback = match Callback::from_query(&request.query, Callback::DEFAULT_QUERY_KEY) {
        Ok(callback) => callback,
        Err(e) => return status::bad_request(sink, &e.to_string()).await,
    };

    let result = match (callback, user) {
        (Some(callback), Some(user)) => JsonP::new(callback, user).success(sink).await,
        (Some(callback), None) => JsonP::with_code(callback, USER_NOT_FOUND, None::<User>).failed(sink).await,
        (None, user) => {
            let Some(format) = ApiFormat::negotiate(&request.headers) else {
                return status::not_acceptable(sink, "only json and xml are available").await;
            };
            match user {
                Some(user) => Negotiated::new(format, user).success(sink).await,
                None => Negotiated::failure(format, USER_NOT_FOUND).failed(sink).await,
            }
        }
    };

    result.map_err(io::Error::other)
}

async fn read_head(tcp_stream: &mut TcpStream) -> io::Result<Request> {
    let mut buf = BytesMut::with_capacity(1024);

    loop {
        if tcp_stream.read_buf(&mut buf).await? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before request head"));
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Request::new(&mut headers);
        match parsed.parse(&buf) {
            Ok(httparse::Status::Complete(_)) => return into_request(&parsed),
            Ok(httparse::Status::Partial) if buf.len() < MAX_HEAD_SIZE => continue,
            Ok(httparse::Status::Partial) => return Err(io::Error::new(io::ErrorKind::InvalidData, "request head too large")),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

fn into_request(parsed: &httparse::Request<'_, '_>) -> io::Result<Request> {
    let invalid = |reason: &str| io::Error::new(io::ErrorKind::InvalidData, reason.to_string());
    let invalid_header = |e: http::Error| io::Error::new(io::ErrorKind::InvalidData, e);

    let method = parsed.method.and_then(|m| Method::from_bytes(m.as_bytes()).ok()).ok_or_else(|| invalid("invalid method"))?;
    let target = parsed.path.ok_or_else(|| invalid("missing request target"))?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let version = match parsed.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };

    let mut headers = HeaderMap::with_capacity(parsed.headers.len());
    for h in parsed.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes()).map_err(|e| invalid_header(e.into()))?;
        let value = HeaderValue::from_bytes(h.value).map_err(|e| invalid_header(e.into()))?;
        headers.append(name, value);
    }

    Ok(Request { method, path: path.to_string(), query: query.to_string(), version, headers })
}
