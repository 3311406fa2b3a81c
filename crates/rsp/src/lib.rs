//! Uniform response formatting for HTTP servers.
//!
//! This crate standardizes how handlers answer: API payloads are padded into a
//! `{code, msg, data}` envelope and written as JSON, JSONP or XML, while text and
//! HTML bodies are written verbatim. It owns no connection, routing or request
//! parsing; it only writes into a [`ResponseSink`] handed over by the host server.
//!
//! # Overview
//!
//! - [`RetCode`]: the `(code, msg)` pair identifying an outcome
//! - [`Envelope`] and [`Padding`]: the envelope and the strategy building it
//! - [`RspConfig`]: success code and padding, passed explicitly or installed once
//! - [`Json`], [`JsonP`], [`Xml`], [`Negotiated`]: enveloped writers ([`ApiWriter`])
//! - [`Text`], [`Html`]: verbatim writers ([`RawWriter`])
//! - [`status`]: plain-text `4xx` responses
//! - [`BufferedSink`], [`StreamSink`]: in-memory and HTTP/1.x wire sinks
//!
//! # Example
//!
//! ```
//! use micro_rsp::{ApiWriter, BufferedSink, Json, RetCode};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//! }
//!
//! const NO_SUCH_USER: RetCode = RetCode::from_static("1404", "no such user");
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut sink = BufferedSink::new();
//! Json::new(User { id: 5 }).success(&mut sink).await.unwrap();
//! assert_eq!(sink.body(), br#"{"code":"0","msg":"Success","data":{"id":5}}"#);
//!
//! let mut sink = BufferedSink::new();
//! Json::failure(NO_SUCH_USER).failed(&mut sink).await.unwrap();
//! assert_eq!(sink.body(), br#"{"code":"1404","msg":"no such user"}"#);
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ApiWriter::success`] and [`ApiWriter::failed`] read [`RspConfig::global`]. To
//! change the success code or the envelope layout for the whole process, install a
//! config at startup, before any response is written:
//!
//! ```
//! use micro_rsp::{ApiWriter, BufferedSink, Envelope, Json, RetCode, RspConfig};
//! use serde_json::{json, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // always send a `data` key, `null` when there is no payload
//! RspConfig::builder()
//!     .success(RetCode::from_static("200", "OK"))
//!     .padding(|rc: &RetCode, data: Option<Value>| {
//!         let mut envelope = Envelope::new(rc);
//!         envelope.insert("data", data.unwrap_or(Value::Null));
//!         envelope
//!     })
//!     .build()
//!     .install()
//!     .expect("installed twice");
//!
//! let mut sink = BufferedSink::new();
//! Json::new(json!({"id": 5})).success(&mut sink).await.unwrap();
//! assert_eq!(sink.body(), br#"{"code":"200","msg":"OK","data":{"id":5}}"#);
//!
//! let mut sink = BufferedSink::new();
//! Json::failure(RetCode::from_static("1404", "no such user")).failed(&mut sink).await.unwrap();
//! assert_eq!(sink.body(), br#"{"code":"1404","msg":"no such user","data":null}"#);
//! # }
//! ```
//!
//! Request-scoped variations go through [`ApiWriter::success_with`] and
//! [`ApiWriter::failed_with`] instead.

mod config;
mod content_type;
mod envelope;
mod error;
mod ret_code;
mod sink;
mod writer;

pub mod status;

pub use config::{RspConfig, RspConfigBuilder};
pub use content_type::ContentType;
pub use envelope::{DefaultPadding, Envelope, Padding, CODE_KEY, DATA_KEY, MSG_KEY};
pub use error::{ConfigError, InvalidCallback, WriteFailed};
pub use ret_code::RetCode;
pub use sink::{BufferedSink, ResponseHead, ResponseSink, StreamSink};
pub use writer::{ApiFormat, ApiWriter, Callback, Html, Json, JsonP, Negotiated, RawWriter, Text, Xml, XML_ROOT_TAG};
