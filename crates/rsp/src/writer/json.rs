use crate::content_type::ContentType;
use crate::envelope::Envelope;
use crate::error::{InvalidCallback, WriteFailed};
use crate::writer::{Api, ApiWriter};
use crate::RetCode;
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// An `application/json` enveloped response.
///
/// ```
/// use micro_rsp::{ApiWriter, BufferedSink, Json};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut sink = BufferedSink::new();
/// Json::new(json!({"id": 5})).success(&mut sink).await.unwrap();
///
/// assert_eq!(sink.body(), br#"{"code":"0","msg":"Success","data":{"id":5}}"#);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Json<T = Value> {
    api: Api<T>,
}

impl<T> Json<T> {
    /// A response carrying `data`; use [`ApiWriter::success`] to send it.
    pub fn new(data: T) -> Self {
        Self { api: Api { rc: RetCode::SUCCESS, data: Some(data) } }
    }

    /// A failure carrying `rc` and an optional payload; use [`ApiWriter::failed`] to send it.
    pub fn with_code(rc: RetCode, data: Option<T>) -> Self {
        Self { api: Api { rc, data } }
    }
}

impl Json<Value> {
    /// A success response without payload: `{"code":"0","msg":"Success"}`.
    pub fn empty() -> Self {
        Self { api: Api::default() }
    }

    /// A failure without payload, the envelope has no `data` key.
    pub fn failure(rc: RetCode) -> Self {
        Self::with_code(rc, None)
    }
}

impl<T> ApiWriter for Json<T>
where
    T: Serialize + Sync,
{
    #[inline]
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    #[inline]
    fn ret_code(&self) -> &RetCode {
        &self.api.rc
    }

    fn payload(&self) -> Result<Option<Value>, WriteFailed> {
        self.api.payload()
    }

    fn encode(&self, envelope: &Envelope) -> Result<Bytes, WriteFailed> {
        encode_json(envelope).map(Bytes::from)
    }
}

pub(crate) fn encode_json(envelope: &Envelope) -> Result<Vec<u8>, WriteFailed> {
    serde_json::to_vec(envelope).map_err(WriteFailed::encode)
}

/// A JSONP function name: javascript identifiers joined by dots, like `jQuery.cb_12`.
///
/// Anything else is rejected, since the name is written into the body as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback(String);

impl Callback {
    pub const DEFAULT_QUERY_KEY: &'static str = "callback";

    /// Validates `name` as a callback.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCallback::Empty`] for an empty name and
    /// [`InvalidCallback::IllegalName`] when a dot separated segment is not an identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidCallback> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidCallback::Empty);
        }
        if !name.split('.').all(is_identifier) {
            return Err(InvalidCallback::illegal_name(name));
        }
        Ok(Self(name))
    }

    /// Looks up `key` in a url-encoded query string, e.g. the query of the request uri.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn from_query(query: &str, key: &str) -> Result<Option<Self>, InvalidCallback> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(InvalidCallback::invalid_query)?;
        pairs.into_iter().find(|(k, _)| k == key).map(|(_, name)| Self::new(name)).transpose()
    }

    /// The validated name, written before `(` byte for byte.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A JSONP response: `callback(<json envelope>)`, served as `text/plain`.
#[derive(Debug, Clone)]
pub struct JsonP<T = Value> {
    api: Api<T>,
    callback: Callback,
}

impl<T> JsonP<T> {
    /// A JSONP response carrying `data`, wrapped into `callback(...)`.
    pub fn new(callback: Callback, data: T) -> Self {
        Self { api: Api { rc: RetCode::SUCCESS, data: Some(data) }, callback }
    }

    /// A JSONP failure carrying `rc` and an optional payload.
    pub fn with_code(callback: Callback, rc: RetCode, data: Option<T>) -> Self {
        Self { api: Api { rc, data }, callback }
    }

    /// The callback the body is wrapped into.
    pub fn callback(&self) -> &Callback {
        &self.callback
    }
}

impl JsonP<Value> {
    /// A JSONP response without payload.
    pub fn empty(callback: Callback) -> Self {
        Self { api: Api::default(), callback }
    }
}

impl<T> ApiWriter for JsonP<T>
where
    T: Serialize + Sync,
{
    #[inline]
    fn content_type(&self) -> ContentType {
        ContentType::JsonP
    }

    #[inline]
    fn ret_code(&self) -> &RetCode {
        &self.api.rc
    }

    fn payload(&self) -> Result<Option<Value>, WriteFailed> {
        self.api.payload()
    }

    fn encode(&self, envelope: &Envelope) -> Result<Bytes, WriteFailed> {
        let json = encode_json(envelope)?;

        let callback = self.callback.as_str().as_bytes();
        let mut body = BytesMut::with_capacity(callback.len() + json.len() + 2);
        body.put_slice(callback);
        body.put_u8(b'(');
        body.put_slice(&json);
        body.put_u8(b')');
        Ok(body.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{BufferedSink, MockResponseSink};
    use crate::RspConfig;
    use http::{header, HeaderMap};
    use serde::ser::Error as _;
    use serde_json::json;
    use std::io;

    #[tokio::test]
    async fn test_json_success() {
        let mut sink = BufferedSink::new();
        Json::new(json!({"id": 5})).success_with(&mut sink, &RspConfig::default()).await.unwrap();

        assert_eq!(sink.headers()[header::CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(sink.body(), br#"{"code":"0","msg":"Success","data":{"id":5}}"#);
    }

    #[tokio::test]
    async fn test_json_failed_round_trip() {
        #[derive(Serialize)]
        struct Field<'a> {
            name: &'a str,
            reason: &'a str,
        }

        let rc = RetCode::from_static("4000", "validation failed");
        let errors = vec![Field { name: "email", reason: "missing" }];
        let config = RspConfig::default();

        let mut sink = BufferedSink::new();
        Json::with_code(rc.clone(), Some(errors)).failed_with(&mut sink, &config).await.unwrap();

        let decoded: Value = serde_json::from_slice(sink.body()).unwrap();
        let expected = config.pad(&rc, Some(json!([{"name": "email", "reason": "missing"}])));
        assert_eq!(decoded, Value::from(expected));
    }

    #[tokio::test]
    async fn test_json_failed_without_data() {
        let mut sink = BufferedSink::new();
        let rc = RetCode::from_static("401", "token expired");
        Json::failure(rc).failed_with(&mut sink, &RspConfig::default()).await.unwrap();

        assert_eq!(sink.body(), br#"{"code":"401","msg":"token expired"}"#);
    }

    #[tokio::test]
    async fn test_success_uses_configured_code() {
        let config = RspConfig::builder().success(RetCode::from_static("200", "OK")).build();

        let mut sink = BufferedSink::new();
        // the writer's own code is only used by `failed`
        Json::with_code(RetCode::from_static("500", "boom"), Some(1)).success_with(&mut sink, &config).await.unwrap();

        assert_eq!(sink.body(), br#"{"code":"200","msg":"OK","data":1}"#);
    }

    #[tokio::test]
    async fn test_jsonp_success() {
        let mut sink = BufferedSink::new();
        JsonP::empty(Callback::new("cb").unwrap()).success_with(&mut sink, &RspConfig::default()).await.unwrap();

        assert_eq!(sink.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(sink.body(), br#"cb({"code":"0","msg":"Success"})"#);
    }

    #[tokio::test]
    async fn test_jsonp_wraps_json_exactly() {
        let config = RspConfig::default();
        let data = json!({"items": ["a", "b"], "total": 2});

        let mut json_sink = BufferedSink::new();
        Json::new(data.clone()).success_with(&mut json_sink, &config).await.unwrap();

        let mut jsonp_sink = BufferedSink::new();
        let callback = Callback::new("jQuery.handlers.$page_2").unwrap();
        JsonP::new(callback, data).success_with(&mut jsonp_sink, &config).await.unwrap();

        let mut expected = b"jQuery.handlers.$page_2(".to_vec();
        expected.extend_from_slice(json_sink.body());
        expected.push(b')');
        assert_eq!(jsonp_sink.body(), &expected[..]);
    }

    #[test]
    fn test_callback_validation() {
        assert!(Callback::new("cb").is_ok());
        assert!(Callback::new("_jsonp.cb$1").is_ok());

        assert_eq!(Callback::new(""), Err(InvalidCallback::Empty));
        for bad in ["alert(1);cb", "cb//", "1cb", "a..b", "cb.", "<script>", "cb name"] {
            assert_eq!(Callback::new(bad), Err(InvalidCallback::illegal_name(bad)), "{bad}");
        }
    }

    #[test]
    fn test_callback_from_query() {
        let callback = Callback::from_query("page=2&callback=jQuery_123&x=y", Callback::DEFAULT_QUERY_KEY).unwrap();
        assert_eq!(callback.map(|c| c.to_string()), Some("jQuery_123".to_string()));

        assert_eq!(Callback::from_query("page=2", "callback"), Ok(None));
        assert_eq!(Callback::from_query("", "callback"), Ok(None));

        let err = Callback::from_query("callback=alert%281%29", "callback").unwrap_err();
        assert_eq!(err, InvalidCallback::illegal_name("alert(1)"));
    }

    struct Unrepresentable;

    impl Serialize for Unrepresentable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    #[tokio::test]
    async fn test_encode_failure_is_write_failed() {
        let mut sink = BufferedSink::new();
        let err = Json::new(Unrepresentable).success_with(&mut sink, &RspConfig::default()).await.unwrap_err();

        assert_eq!(err.to_string(), "failed to write message to http response");
        assert!(sink.body().is_empty());
    }

    #[tokio::test]
    async fn test_closed_sink_is_write_failed() {
        let mut sink = BufferedSink::new();
        sink.close();

        let err = JsonP::empty(Callback::new("cb").unwrap()).success_with(&mut sink, &RspConfig::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to write message to http response");
    }

    #[tokio::test]
    async fn test_broken_sink_is_write_failed() {
        let mut sink = MockResponseSink::new();
        sink.expect_headers_mut().return_var(HeaderMap::new());
        sink.expect_write().times(1).returning(|_| Err(io::Error::from(io::ErrorKind::BrokenPipe)));

        let result = Json::failure(RetCode::from_static("1", "x")).failed_with(&mut sink, &RspConfig::default()).await;
        assert!(result.is_err());
    }
}
