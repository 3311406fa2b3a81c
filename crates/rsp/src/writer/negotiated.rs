//! Picks the envelope format from the request `Accept` header.

use crate::content_type::ContentType;
use crate::envelope::Envelope;
use crate::error::WriteFailed;
use crate::writer::json::encode_json;
use crate::writer::xml::encode_map;
use crate::writer::{Api, ApiWriter, XML_ROOT_TAG};
use crate::RetCode;
use bytes::Bytes;
use http::{header, HeaderMap};
use mime::Mime;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::trace;

/// Wire format of an enveloped response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiFormat {
    #[default]
    Json,
    Xml,
}

/// The range that decides the `q` of one format: the most specific match wins.
#[derive(Debug, Clone, Copy)]
struct Preference {
    specificity: u8,
    position: usize,
    q: f32,
}

impl ApiFormat {
    const ALL: [ApiFormat; 2] = [ApiFormat::Json, ApiFormat::Xml];

    /// Chooses a format from the `Accept` headers of a request.
    ///
    /// Each format takes its `q` from the most specific range matching it (exact
    /// type, then `+json`/`+xml` suffix, then `application/*`, then `*/*`), so
    /// `application/json;q=0, */*` refuses JSON but still accepts XML. The format
    /// with the highest `q` wins, the one decided by the earliest range on ties.
    ///
    /// A request without `Accept` gets JSON. Returns `None` when nothing acceptable
    /// is offered, answer with [`not_acceptable`](crate::status::not_acceptable) then.
    pub fn negotiate(headers: &HeaderMap) -> Option<Self> {
        let mut ranges = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|range| !range.is_empty())
            .peekable();

        if ranges.peek().is_none() {
            return Some(Self::Json);
        }

        let mut preferences: [Option<Preference>; 2] = [None; 2];
        for (position, range) in ranges.enumerate() {
            let media_range = match range.parse::<Mime>() {
                Ok(media_range) => media_range,
                Err(e) => {
                    trace!(range, cause = %e, "skip malformed media range");
                    continue;
                }
            };

            let q = quality(&media_range);
            for (format, preference) in Self::ALL.into_iter().zip(preferences.iter_mut()) {
                let Some(specificity) = format.specificity(&media_range) else {
                    continue;
                };
                if preference.is_none_or(|p| specificity > p.specificity) {
                    *preference = Some(Preference { specificity, position, q });
                }
            }
        }

        let mut best: Option<(Preference, Self)> = None;
        for (format, preference) in Self::ALL.into_iter().zip(preferences) {
            let Some(preference) = preference.filter(|p| p.q > 0.0) else {
                continue;
            };
            let better = best.is_none_or(|(b, _)| match preference.q.total_cmp(&b.q) {
                Ordering::Greater => true,
                Ordering::Equal => preference.position < b.position,
                Ordering::Less => false,
            });
            if better {
                best = Some((preference, format));
            }
        }

        best.map(|(_, format)| format)
    }

    /// How specifically `media_range` names this format, `None` if it does not match.
    fn specificity(self, media_range: &Mime) -> Option<u8> {
        let (type_, subtype) = (media_range.type_(), media_range.subtype());
        let (exact, suffix) = match self {
            ApiFormat::Json => (type_ == mime::APPLICATION && subtype == mime::JSON, mime::JSON),
            ApiFormat::Xml => ((type_ == mime::APPLICATION || type_ == mime::TEXT) && subtype == mime::XML, mime::XML),
        };

        if exact {
            Some(4)
        } else if media_range.suffix().is_some_and(|s| s == suffix) {
            Some(3)
        } else if type_ == mime::APPLICATION && subtype == mime::STAR {
            Some(2)
        } else if type_ == mime::STAR && subtype == mime::STAR {
            Some(1)
        } else {
            None
        }
    }

    /// The `Content-Type` a response in this format is sent with.
    pub fn content_type(self) -> ContentType {
        match self {
            ApiFormat::Json => ContentType::Json,
            ApiFormat::Xml => ContentType::Xml,
        }
    }
}

fn quality(media_range: &Mime) -> f32 {
    media_range
        .get_param("q")
        .and_then(|q| q.as_str().parse::<f32>().ok())
        .map_or(1.0, |q| q.clamp(0.0, 1.0))
}

/// An enveloped response rendered as JSON or XML, chosen per request.
///
/// ```
/// use http::{header, HeaderMap, HeaderValue};
/// use micro_rsp::{ApiFormat, Negotiated};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::ACCEPT, HeaderValue::from_static("text/html, application/xml;q=0.9"));
///
/// let format = ApiFormat::negotiate(&headers).unwrap();
/// let rsp = Negotiated::new(format, vec!["a", "b"]);
/// assert_eq!(rsp.format(), ApiFormat::Xml);
/// ```
#[derive(Debug, Clone)]
pub struct Negotiated<T = Value> {
    api: Api<T>,
    format: ApiFormat,
}

impl<T> Negotiated<T> {
    /// A response carrying `data`, rendered as `format`.
    pub fn new(format: ApiFormat, data: T) -> Self {
        Self { api: Api { rc: RetCode::SUCCESS, data: Some(data) }, format }
    }

    /// A failure carrying `rc` and an optional payload, rendered as `format`.
    pub fn with_code(format: ApiFormat, rc: RetCode, data: Option<T>) -> Self {
        Self { api: Api { rc, data }, format }
    }

    /// The format chosen at construction.
    #[inline]
    pub fn format(&self) -> ApiFormat {
        self.format
    }
}

impl Negotiated<Value> {
    /// A failure without payload, rendered as `format`.
    pub fn failure(format: ApiFormat, rc: RetCode) -> Self {
        Self::with_code(format, rc, None)
    }
}

impl<T> ApiWriter for Negotiated<T>
where
    T: Serialize + Sync,
{
    #[inline]
    fn content_type(&self) -> ContentType {
        self.format.content_type()
    }

    #[inline]
    fn ret_code(&self) -> &RetCode {
        &self.api.rc
    }

    fn payload(&self) -> Result<Option<Value>, WriteFailed> {
        self.api.payload()
    }

    fn encode(&self, envelope: &Envelope) -> Result<Bytes, WriteFailed> {
        match self.format {
            ApiFormat::Json => encode_json(envelope).map(Bytes::from),
            ApiFormat::Xml => encode_map(XML_ROOT_TAG, envelope.as_map()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferedSink;
    use crate::writer::xml::tests::decode;
    use crate::RspConfig;
    use http::HeaderValue;
    use serde_json::json;

    fn accept(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for &value in values {
            headers.append(header::ACCEPT, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_negotiate() {
        assert_eq!(ApiFormat::negotiate(&HeaderMap::new()), Some(ApiFormat::Json));
        assert_eq!(ApiFormat::negotiate(&accept(&[""])), Some(ApiFormat::Json));
        assert_eq!(ApiFormat::negotiate(&accept(&["*/*"])), Some(ApiFormat::Json));
        assert_eq!(ApiFormat::negotiate(&accept(&["application/*"])), Some(ApiFormat::Json));
        assert_eq!(ApiFormat::negotiate(&accept(&["text/xml"])), Some(ApiFormat::Xml));
        assert_eq!(ApiFormat::negotiate(&accept(&["application/problem+xml"])), Some(ApiFormat::Xml));
        assert_eq!(ApiFormat::negotiate(&accept(&["application/vnd.api+json"])), Some(ApiFormat::Json));
    }

    #[test]
    fn test_negotiate_quality() {
        let headers = accept(&["application/json;q=0.5, application/xml"]);
        assert_eq!(ApiFormat::negotiate(&headers), Some(ApiFormat::Xml));

        // ties keep the first range
        let headers = accept(&["application/xml;q=0.8", "application/json;q=0.8"]);
        assert_eq!(ApiFormat::negotiate(&headers), Some(ApiFormat::Xml));

        let headers = accept(&["application/json;q=0, text/xml;q=0.1"]);
        assert_eq!(ApiFormat::negotiate(&headers), Some(ApiFormat::Xml));

        // a specific refusal is not overridden by a wildcard
        let headers = accept(&["application/json;q=0, */*"]);
        assert_eq!(ApiFormat::negotiate(&headers), Some(ApiFormat::Xml));

        let headers = accept(&["application/json;q=0", "application/xml;q=0, */*"]);
        assert_eq!(ApiFormat::negotiate(&headers), None);

        let headers = accept(&["*/*;q=0, application/json"]);
        assert_eq!(ApiFormat::negotiate(&headers), Some(ApiFormat::Json));

        let headers = accept(&["application/*;q=0.2, application/xml;q=0.1, */*;q=0.9"]);
        assert_eq!(ApiFormat::negotiate(&headers), Some(ApiFormat::Json));
    }

    #[test]
    fn test_negotiate_nothing_acceptable() {
        assert_eq!(ApiFormat::negotiate(&accept(&["text/html"])), None);
        assert_eq!(ApiFormat::negotiate(&accept(&["application/json;q=0"])), None);
        assert_eq!(ApiFormat::negotiate(&accept(&["not a media range"])), None);
    }

    #[tokio::test]
    async fn test_negotiated_writes_chosen_format() {
        let config = RspConfig::default();

        let mut sink = BufferedSink::new();
        Negotiated::new(ApiFormat::Json, json!({"n": 1})).success_with(&mut sink, &config).await.unwrap();
        assert_eq!(sink.headers()[header::CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(sink.body(), br#"{"code":"0","msg":"Success","data":{"n":1}}"#);

        let mut sink = BufferedSink::new();
        let rc = RetCode::from_static("9", "nope");
        Negotiated::failure(ApiFormat::Xml, rc).failed_with(&mut sink, &config).await.unwrap();
        assert_eq!(sink.headers()[header::CONTENT_TYPE], "application/xml; charset=utf-8");
        assert_eq!(decode(sink.body()), (XML_ROOT_TAG.to_string(), json!({"code": "9", "msg": "nope"})));
    }
}
