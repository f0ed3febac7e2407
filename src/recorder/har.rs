//! HAR-like request records.
//!
//! One `RequestRecord` is one line of the request log, modeled after the
//! `request` object of the HTTP Archive format.

use axum::http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};

/// A `{name, value}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Body of a recorded request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    /// Declared Content-Type, empty when none was sent.
    pub mime_type: String,
    /// Raw body text.
    pub text: String,
    /// Decoded form fields; file fields carry a placeholder value.
    pub params: Vec<NameValue>,
}

/// Snapshot of one proxied request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    pub headers: Vec<NameValue>,
    pub query_string: Vec<NameValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
}

impl RequestRecord {
    /// Record method, URL, headers and query string. The body is attached later.
    pub fn new(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            method: method.to_string(),
            url: uri.to_string(),
            headers: header_pairs(headers),
            query_string: parse_query_string(uri.query().unwrap_or_default()),
            post_data: None,
        }
    }
}

/// Header pairs in map iteration order, one entry per value.
pub fn header_pairs(headers: &HeaderMap) -> Vec<NameValue> {
    headers
        .iter()
        .map(|(name, value)| {
            NameValue::new(name.as_str(), String::from_utf8_lossy(value.as_bytes()))
        })
        .collect()
}

/// Split a raw query on `&`, then on the first `=`. No percent-decoding.
pub fn parse_query_string(query: &str) -> Vec<NameValue> {
    if query.is_empty() {
        return Vec::new();
    }

    query
        .split('&')
        .map(|part| match part.split_once('=') {
            Some((name, value)) => NameValue::new(name, value),
            None => NameValue::new(part, ""),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_keeps_duplicates_in_order() {
        let pairs = parse_query_string("k1=v1&k2=v2&k2=v3");
        assert_eq!(
            pairs,
            vec![
                NameValue::new("k1", "v1"),
                NameValue::new("k2", "v2"),
                NameValue::new("k2", "v3"),
            ]
        );
    }

    #[test]
    fn test_query_string_raw_values() {
        let pairs = parse_query_string("flag&q=a%20b&eq=x=y&");
        assert_eq!(
            pairs,
            vec![
                NameValue::new("flag", ""),
                NameValue::new("q", "a%20b"),
                NameValue::new("eq", "x=y"),
                NameValue::new("", ""),
            ]
        );
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_duplicate_headers_are_separate_entries() {
        let mut headers = HeaderMap::new();
        headers.append("accept", "text/html".parse().unwrap());
        headers.append("x-multi", "one".parse().unwrap());
        headers.append("x-multi", "two".parse().unwrap());

        let pairs = header_pairs(&headers);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], NameValue::new("x-multi", "one"));
        assert_eq!(pairs[2], NameValue::new("x-multi", "two"));
    }

    #[test]
    fn test_serialized_shape() {
        let uri: Uri = "http://127.0.0.1:8081/a?x=1".parse().unwrap();
        let mut record = RequestRecord::new(&Method::GET, &uri, &HeaderMap::new());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["url"], "http://127.0.0.1:8081/a?x=1");
        assert_eq!(json["queryString"][0]["name"], "x");
        assert!(json["headers"].as_array().unwrap().is_empty());
        assert!(json.get("postData").is_none());

        record.post_data = Some(PostData {
            mime_type: "text/plain".into(),
            text: "hi".into(),
            params: Vec::new(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["postData"]["mimeType"], "text/plain");
        assert_eq!(json["postData"]["text"], "hi");
    }
}
