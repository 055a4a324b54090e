//! Strict JSON request decoding.

use axum::body::Body;
use axum::http::StatusCode;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use thiserror::Error;

use crate::observability::metrics;

/// Default ceiling on a JSON request body (1 MiB).
pub const DEFAULT_MAX_JSON_BYTES: usize = 1024 * 1024;

/// Decode behaviour, fixed per [`JsonCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JsonPolicy {
    /// Largest accepted body in bytes.
    pub max_body_bytes: usize,

    /// Accept object keys that have no matching field in the target type.
    pub allow_unknown_fields: bool,
}

impl Default for JsonPolicy {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_JSON_BYTES,
            allow_unknown_fields: false,
        }
    }
}

/// Stable category of a [`JsonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonErrorKind {
    BodyTooLarge,
    MalformedJson,
    IncompleteJson,
    TypeMismatch,
    EmptyBody,
    UnknownField,
    InvalidTarget,
    MultipleValues,
    Unclassified,
    Encode,
}

impl JsonErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BodyTooLarge => "body_too_large",
            Self::MalformedJson => "malformed_json",
            Self::IncompleteJson => "incomplete_json",
            Self::TypeMismatch => "type_mismatch",
            Self::EmptyBody => "empty_body",
            Self::UnknownField => "unknown_field",
            Self::InvalidTarget => "invalid_target",
            Self::MultipleValues => "multiple_values",
            Self::Unclassified => "unclassified",
            Self::Encode => "encode",
        }
    }
}

/// JSON decode and encode failures.
///
/// The `Display` text of every decode variant is forwarded verbatim to
/// clients, so it must stay byte-for-byte stable.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("the request body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("the request body contains malformed JSON (at character {offset})")]
    MalformedJson { offset: usize },

    #[error("the request body contains incomplete JSON")]
    IncompleteJson,

    /// `field` is the dotted path of the offending field when known.
    #[error("{}", type_mismatch_message(.field.as_deref(), *.offset))]
    TypeMismatch { field: Option<String>, offset: usize },

    #[error("the request body must not be empty")]
    EmptyBody,

    #[error("the request body contains an unknown key {key:?}")]
    UnknownField { key: String },

    /// The target type rejected decoding independent of the input.
    #[error("unable to unmarshal the JSON request body: {0}")]
    InvalidTarget(String),

    #[error("body must contain only one JSON value")]
    MultipleValues,

    #[error(transparent)]
    Unclassified(serde_json::Error),

    /// Reading the request body failed.
    #[error("failed to read the request body: {0}")]
    Body(axum::Error),

    /// Serializing a response payload failed.
    #[error("failed to encode JSON response: {0}")]
    Encode(serde_json::Error),
}

fn type_mismatch_message(field: Option<&str>, offset: usize) -> String {
    match field {
        Some(field) => format!("the request body contains an incorrect JSON type for field {field:?}"),
        None => format!("the request body contains an incorrect JSON type (at character {offset})"),
    }
}

impl JsonError {
    pub fn kind(&self) -> JsonErrorKind {
        match self {
            Self::BodyTooLarge { .. } => JsonErrorKind::BodyTooLarge,
            Self::MalformedJson { .. } => JsonErrorKind::MalformedJson,
            Self::IncompleteJson => JsonErrorKind::IncompleteJson,
            Self::TypeMismatch { .. } => JsonErrorKind::TypeMismatch,
            Self::EmptyBody => JsonErrorKind::EmptyBody,
            Self::UnknownField { .. } => JsonErrorKind::UnknownField,
            Self::InvalidTarget(_) => JsonErrorKind::InvalidTarget,
            Self::MultipleValues => JsonErrorKind::MultipleValues,
            Self::Unclassified(_) | Self::Body(_) => JsonErrorKind::Unclassified,
            Self::Encode(_) => JsonErrorKind::Encode,
        }
    }

    /// Status used when this error is rendered as a response.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Decodes request bodies under a [`JsonPolicy`].
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    policy: JsonPolicy,
}

impl JsonCodec {
    pub fn new(policy: JsonPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &JsonPolicy {
        &self.policy
    }

    /// Read `body` up to the size ceiling and decode exactly one JSON value.
    pub async fn read_json<T: DeserializeOwned>(&self, body: Body) -> Result<T, JsonError> {
        let result = match self.read_limited(body).await {
            Ok(bytes) => self.decode(&bytes),
            Err(err) => Err(err),
        };
        record_failure(result)
    }

    /// Decode exactly one JSON value from an in-memory body.
    pub fn decode_slice<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, JsonError> {
        record_failure(self.decode(body))
    }

    async fn read_limited(&self, body: Body) -> Result<Vec<u8>, JsonError> {
        let limit = self.policy.max_body_bytes;
        let mut stream = body.into_data_stream();
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(JsonError::Body)?;
            if buf.len() + chunk.len() > limit {
                return Err(JsonError::BodyTooLarge { limit });
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, JsonError> {
        let limit = self.policy.max_body_bytes;
        if body.len() > limit {
            return Err(JsonError::BodyTooLarge { limit });
        }
        if body.iter().all(|b| is_json_whitespace(*b)) {
            return Err(JsonError::EmptyBody);
        }

        let mut de = serde_json::Deserializer::from_slice(body);
        let mut unknown_key: Option<String> = None;
        let mut on_ignored = |path: serde_ignored::Path<'_>| {
            if unknown_key.is_none() {
                unknown_key = Some(last_key(&path));
            }
        };

        let decoded: Result<T, _> =
            serde_path_to_error::deserialize(serde_ignored::Deserializer::new(&mut de, &mut on_ignored));
        let unknown_key = unknown_key.filter(|_| !self.policy.allow_unknown_fields);

        let value = match (decoded, unknown_key) {
            (Ok(value), None) => value,
            (Ok(_), Some(key)) => return Err(JsonError::UnknownField { key }),
            (Err(err), unknown_key) => {
                let err = classify(err, body);
                // An unknown key seen before e.g. a missing field is the better report.
                return Err(match (err.kind(), unknown_key) {
                    (JsonErrorKind::Unclassified, Some(key)) => JsonError::UnknownField { key },
                    _ => err,
                });
            }
        };

        de.end().map_err(|_| JsonError::MultipleValues)?;
        Ok(value)
    }
}

fn record_failure<T>(result: Result<T, JsonError>) -> Result<T, JsonError> {
    if let Err(err) = &result {
        metrics::record_decode_failure(err.kind().as_str());
    }
    result
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Key name of an ignored map entry, or the full path for anything else.
fn last_key(path: &serde_ignored::Path<'_>) -> String {
    match path {
        serde_ignored::Path::Map { key, .. } => key.clone(),
        other => other.to_string(),
    }
}

fn classify(err: serde_path_to_error::Error<serde_json::Error>, body: &[u8]) -> JsonError {
    let field = (err.path().iter().next().is_some()).then(|| err.path().to_string());
    let inner = err.into_inner();
    let offset = byte_offset(body, inner.line(), inner.column());

    match inner.classify() {
        Category::Syntax => JsonError::MalformedJson { offset },
        Category::Eof => JsonError::IncompleteJson,
        Category::Data => {
            let message = inner.to_string();
            if message.starts_with("invalid type") || message.starts_with("invalid value") {
                JsonError::TypeMismatch { field, offset }
            } else if let Some(key) = denied_field(&message) {
                JsonError::UnknownField { key }
            } else if inner.line() == 0 {
                JsonError::InvalidTarget(message)
            } else {
                JsonError::Unclassified(inner)
            }
        }
        Category::Io => JsonError::Unclassified(inner),
    }
}

/// Key named by serde's own `deny_unknown_fields` error.
fn denied_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Convert serde_json's 1-based line/column into a 1-based byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    line_start + column
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Foo {
        foo: String,
    }

    #[derive(Debug, Deserialize)]
    struct Required {
        #[allow(dead_code)]
        foo: String,
    }

    #[derive(Debug, Deserialize)]
    struct Nested {
        #[allow(dead_code)]
        inner: Foo,
    }

    fn strict() -> JsonCodec {
        JsonCodec::default()
    }

    fn lenient() -> JsonCodec {
        JsonCodec::new(JsonPolicy {
            allow_unknown_fields: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_decode_cases() {
        let cases: &[(&str, &str, Option<JsonErrorKind>, bool)] = &[
            ("good json", r#"{"foo": "bar"}"#, None, false),
            ("badly formatted json", r#"{"foo":}"#, Some(JsonErrorKind::MalformedJson), false),
            ("incorrect type", r#"{"foo": 1}"#, Some(JsonErrorKind::TypeMismatch), false),
            ("two json values", r#"{"foo": "1"}{"alpha": "beta"}"#, Some(JsonErrorKind::MultipleValues), false),
            ("empty body", "", Some(JsonErrorKind::EmptyBody), false),
            ("whitespace body", " \n\t", Some(JsonErrorKind::EmptyBody), false),
            ("syntax error in json", r#"{"foo": "1" "x"}"#, Some(JsonErrorKind::MalformedJson), false),
            ("unknown field", r#"{"fooo": "1"}"#, Some(JsonErrorKind::UnknownField), false),
            ("allow unknown fields", r#"{"foo": "1", "fooo": "1"}"#, None, true),
            ("missing field name", r#"{jack: "1"}"#, Some(JsonErrorKind::MalformedJson), true),
            ("not json", "Hello, world!", Some(JsonErrorKind::MalformedJson), false),
            ("truncated", r#"{"foo": "ba"#, Some(JsonErrorKind::IncompleteJson), false),
            ("trailing garbage", r#"{"foo": "bar"} nope"#, Some(JsonErrorKind::MultipleValues), false),
            ("trailing whitespace", "{\"foo\": \"bar\"}\n\n", None, false),
        ];

        for (name, body, expected, allow_unknown) in cases {
            let codec = if *allow_unknown { lenient() } else { strict() };
            let result = codec.decode_slice::<Foo>(body.as_bytes());
            match expected {
                None => assert!(result.is_ok(), "{}: unexpected error {:?}", name, result),
                Some(kind) => {
                    let err = result.expect_err(name);
                    assert_eq!(err.kind(), *kind, "{}: {}", name, err);
                }
            }
        }
    }

    #[test]
    fn test_unknown_field_rejected_then_allowed() {
        let err = strict().decode_slice::<Foo>(br#"{"fooo":"1"}"#).unwrap_err();
        assert_eq!(err.to_string(), r#"the request body contains an unknown key "fooo""#);

        let foo = lenient().decode_slice::<Foo>(br#"{"fooo":"1"}"#).unwrap();
        assert_eq!(foo, Foo::default());
    }

    #[test]
    fn test_unknown_field_reported_over_missing_field() {
        let err = strict().decode_slice::<Required>(br#"{"fooo":"1"}"#).unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::UnknownField);

        let err = lenient().decode_slice::<Required>(br#"{"fooo":"1"}"#).unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::Unclassified);
    }

    #[test]
    fn test_body_too_large() {
        let codec = JsonCodec::new(JsonPolicy {
            max_body_bytes: 5,
            ..Default::default()
        });
        let err = codec.decode_slice::<Foo>(br#"{"foo": "bar"}"#).unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::BodyTooLarge);
        assert_eq!(err.to_string(), "the request body must not be larger than 5 bytes");
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_messages() {
        let cases: &[(&str, &str)] = &[
            (r#"{"foo": bar}"#, "the request body contains malformed JSON (at character 9)"),
            ("{\n\"foo\": bar}", "the request body contains malformed JSON (at character 10)"),
            (r#"{"foo": 1}"#, r#"the request body contains an incorrect JSON type for field "foo""#),
            ("1", "the request body contains an incorrect JSON type (at character 1)"),
            ("", "the request body must not be empty"),
            (r#"{"foo": "a""#, "the request body contains incomplete JSON"),
            (r#"{"foo":"1"}{"alpha":"beta"}"#, "body must contain only one JSON value"),
        ];
        for (body, expected) in cases {
            let err = strict().decode_slice::<Foo>(body.as_bytes()).unwrap_err();
            assert_eq!(err.to_string(), *expected, "body: {}", body);
        }
    }

    #[test]
    fn test_nested_field_path() {
        let err = strict()
            .decode_slice::<Nested>(br#"{"inner": {"foo": false}}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"the request body contains an incorrect JSON type for field "inner.foo""#
        );

        let err = strict()
            .decode_slice::<Nested>(br#"{"inner": {"foo": "x", "extra": 1}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), r#"the request body contains an unknown key "extra""#);
    }

    #[test]
    fn test_unclassified_passthrough() {
        let err = strict().decode_slice::<Required>(b"{}").unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::Unclassified);
        assert!(err.to_string().starts_with("missing field `foo`"), "{}", err);
    }

    #[test]
    fn test_target_rejects_without_reading_input() {
        #[derive(Debug)]
        struct Unreadable;

        impl<'de> Deserialize<'de> for Unreadable {
            fn deserialize<D: serde::Deserializer<'de>>(_: D) -> Result<Self, D::Error> {
                Err(serde::de::Error::custom("not a receptacle"))
            }
        }

        let err = strict().decode_slice::<Unreadable>(br#"{"foo": "bar"}"#).unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::InvalidTarget);
        assert_eq!(
            err.to_string(),
            "unable to unmarshal the JSON request body: not a receptacle"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_type_mismatch_beats_unknown_field() {
        let err = strict().decode_slice::<Foo>(br#"{"fooo": 1, "foo": 2}"#).unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::TypeMismatch);
    }

    #[test]
    fn test_maps_accept_any_key() {
        let map: HashMap<String, i32> = strict().decode_slice(br#"{"a": 1, "b": 2}"#).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[tokio::test]
    async fn test_read_json_from_body() {
        let foo: Foo = strict().read_json(Body::from(r#"{"foo":"bar"}"#)).await.unwrap();
        assert_eq!(foo, Foo { foo: "bar".into() });

        let small = JsonCodec::new(JsonPolicy {
            max_body_bytes: 5,
            ..Default::default()
        });
        let err = small.read_json::<Foo>(Body::from(r#"{"foo":"bar"}"#)).await.unwrap_err();
        assert_eq!(err.kind(), JsonErrorKind::BodyTooLarge);
    }
}
