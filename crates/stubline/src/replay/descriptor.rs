//! Normalization of transport requests into `RequestDescriptor`s.

use crate::rules::RequestDescriptor;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Application name and match path extracted from a replay URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayTarget {
    pub application: String,
    /// Remainder of the path after the application segment, starting with `/`
    pub path: String,
}

/// Split a request path into application name and match path.
///
/// Accepts both `/<app>/<rest>` and `/<prefix>/<app>/<rest>`. Returns `None`
/// when there is no application segment.
pub fn split_replay_path(path: &str, prefix: &str) -> Option<ReplayTarget> {
    let mut rest = path.strip_prefix('/').unwrap_or(path);

    if let Some(after_prefix) = rest
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('/'))
    {
        if !after_prefix.is_empty() && !after_prefix.starts_with('/') {
            rest = after_prefix;
        }
    }

    let (application, remainder) = match rest.split_once('/') {
        Some((app, remainder)) => (app, remainder),
        None => (rest, ""),
    };
    if application.is_empty() {
        return None;
    }

    Some(ReplayTarget {
        application: percent_decode(application).into_owned(),
        path: format!("/{}", percent_decode(remainder)),
    })
}

/// Value of the first `name` parameter in a query string.
///
/// `?name=` and a bare `?name` both yield `Some("")`; a missing parameter yields `None`.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| form_decode(key) == name)
        .map(|(_, value)| form_decode(value))
}

/// Media type of a `Content-Type` header value, without parameters
fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}

/// `application/json` and `+json` suffixed types such as `application/vnd.api+json`
fn is_json_media_type(media_type: &str) -> bool {
    let lower = media_type.to_ascii_lowercase();
    lower == "application/json" || lower.ends_with("+json")
}

/// Parse a request body into a key/value mapping.
///
/// JSON objects map directly when the content type is JSON or absent;
/// urlencoded forms map to string values. Anything else is an empty mapping.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }

    match content_type.map(media_type) {
        Some(media) if media.eq_ignore_ascii_case("application/x-www-form-urlencoded") => {
            let text = String::from_utf8_lossy(body);
            let mut form = Map::new();
            for pair in text.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                form.entry(form_decode(key))
                    .or_insert_with(|| Value::String(form_decode(value)));
            }
            form
        }
        Some(media) if !is_json_media_type(media) => Map::new(),
        _ => match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
    }
}

/// Build the descriptor the matcher sees for a replay request
pub fn build_descriptor(
    method: &str,
    target: &ReplayTarget,
    query: Option<&str>,
    identifier_param: &str,
    content_type: Option<&str>,
    body: &[u8],
) -> RequestDescriptor {
    RequestDescriptor {
        path: target.path.clone(),
        method: method.to_string(),
        unique_identifier: query_param(query, identifier_param),
        body: parse_body(content_type, body),
    }
}

fn percent_decode(s: &str) -> Cow<'_, str> {
    urlencoding::decode(s).unwrap_or(Cow::Borrowed(s))
}

fn form_decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PREFIX: &str = "simulated-data";

    fn target(app: &str, path: &str) -> Option<ReplayTarget> {
        Some(ReplayTarget {
            application: app.to_string(),
            path: path.to_string(),
        })
    }

    #[test]
    fn test_split_primary_form() {
        assert_eq!(split_replay_path("/billing/invoice", PREFIX), target("billing", "/invoice"));
        assert_eq!(
            split_replay_path("/billing/invoice/42/lines", PREFIX),
            target("billing", "/invoice/42/lines")
        );
    }

    #[test]
    fn test_split_namespaced_form() {
        assert_eq!(
            split_replay_path("/simulated-data/billing/invoice", PREFIX),
            target("billing", "/invoice")
        );
    }

    #[test]
    fn test_split_application_only() {
        assert_eq!(split_replay_path("/billing", PREFIX), target("billing", "/"));
        assert_eq!(split_replay_path("/billing/", PREFIX), target("billing", "/"));
        assert_eq!(
            split_replay_path("/simulated-data", PREFIX),
            target("simulated-data", "/")
        );
    }

    #[test]
    fn test_split_keeps_trailing_slash() {
        assert_eq!(
            split_replay_path("/billing/invoice/", PREFIX),
            target("billing", "/invoice/")
        );
    }

    #[test]
    fn test_split_no_application() {
        assert_eq!(split_replay_path("/", PREFIX), None);
        assert_eq!(split_replay_path("", PREFIX), None);
        assert_eq!(split_replay_path("//invoice", PREFIX), None);
    }

    #[test]
    fn test_split_decodes_segments() {
        assert_eq!(
            split_replay_path("/billing/my%20invoice", PREFIX),
            target("billing", "/my invoice")
        );
        assert_eq!(
            split_replay_path("/bill%2Fing/x", PREFIX),
            target("bill/ing", "/x")
        );
    }

    #[test]
    fn test_split_prefix_must_be_whole_segment() {
        assert_eq!(
            split_replay_path("/simulated-database/x", PREFIX),
            target("simulated-database", "/x")
        );
    }

    #[test]
    fn test_query_param_presence() {
        assert_eq!(query_param(None, "uniqueIdentifier"), None);
        assert_eq!(query_param(Some("other=1"), "uniqueIdentifier"), None);
        assert_eq!(
            query_param(Some("uniqueIdentifier=abc"), "uniqueIdentifier"),
            Some("abc".to_string())
        );
        assert_eq!(
            query_param(Some("uniqueIdentifier="), "uniqueIdentifier"),
            Some(String::new())
        );
        assert_eq!(
            query_param(Some("uniqueIdentifier"), "uniqueIdentifier"),
            Some(String::new())
        );
    }

    #[test]
    fn test_query_param_first_wins_and_decodes() {
        assert_eq!(
            query_param(
                Some("x=1&uniqueIdentifier=a%20b&uniqueIdentifier=c"),
                "uniqueIdentifier"
            ),
            Some("a b".to_string())
        );
        assert_eq!(
            query_param(Some("uniqueIdentifier=a+b"), "uniqueIdentifier"),
            Some("a b".to_string())
        );
    }

    #[test]
    fn test_parse_json_body() {
        let body = parse_body(Some("application/json"), br#"{"a": 1, "b": {"c": [1, 2]}}"#);
        assert_eq!(body["a"], json!(1));
        assert_eq!(body["b"], json!({"c": [1, 2]}));
    }

    #[test]
    fn test_parse_json_without_content_type() {
        let body = parse_body(None, br#"{"a": true}"#);
        assert_eq!(body["a"], json!(true));
    }

    #[test]
    fn test_parse_non_object_bodies_are_empty() {
        assert!(parse_body(Some("application/json"), b"").is_empty());
        assert!(parse_body(Some("application/json"), b"[1, 2]").is_empty());
        assert!(parse_body(Some("application/json"), b"\"text\"").is_empty());
        assert!(parse_body(Some("text/plain"), b"hello").is_empty());
    }

    #[test]
    fn test_json_object_under_other_content_type_is_empty() {
        assert!(parse_body(Some("text/plain"), br#"{"a": 1}"#).is_empty());
        assert!(parse_body(Some("application/xml"), br#"{"a": 1}"#).is_empty());
    }

    #[test]
    fn test_json_content_type_variants() {
        let body = parse_body(Some("application/json; charset=utf-8"), br#"{"a": 1}"#);
        assert_eq!(body["a"], json!(1));
        let body = parse_body(Some("Application/JSON"), br#"{"a": 1}"#);
        assert_eq!(body["a"], json!(1));
        let body = parse_body(Some("application/vnd.api+json"), br#"{"a": 1}"#);
        assert_eq!(body["a"], json!(1));
    }

    #[test]
    fn test_parse_form_body() {
        let body = parse_body(
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            b"name=Jane+Doe&city=S%C3%A3o&name=ignored&flag",
        );
        assert_eq!(body["name"], json!("Jane Doe"));
        assert_eq!(body["city"], json!("São"));
        assert_eq!(body["flag"], json!(""));
    }

    #[test]
    fn test_build_descriptor() {
        let target = ReplayTarget {
            application: "billing".to_string(),
            path: "/invoice".to_string(),
        };
        let descriptor = build_descriptor(
            "POST",
            &target,
            Some("uniqueIdentifier=u1"),
            "uniqueIdentifier",
            Some("application/json"),
            br#"{"a": 1}"#,
        );

        assert_eq!(descriptor.path, "/invoice");
        assert_eq!(descriptor.method, "POST");
        assert_eq!(descriptor.unique_identifier.as_deref(), Some("u1"));
        assert_eq!(descriptor.body["a"], json!(1));
    }
}
