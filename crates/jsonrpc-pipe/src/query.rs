//! URL-encoded query strings as handed over by an HTTP front end.

use serde_json::{Map, Value};

/// Decode `key=value` pairs. `+` is read as a space and malformed percent
/// escapes are decoded lossily rather than rejected.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

/// The payload carried under `key`, if present. Later duplicates win.
pub fn extract_query_payload(query: &str, key: &str) -> Option<String> {
    parse_query(query)
        .into_iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v)
        .last()
}

/// Every parameter except `key`, as ambient string values. Later duplicates win.
pub fn ambient_from_query(query: &str, key: &str) -> Map<String, Value> {
    parse_query(query)
        .into_iter()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_payload() {
        let query = "q=%7B%22jsonrpc%22%3A%222.0%22%7D&user=bob";
        assert_eq!(
            extract_query_payload(query, "q").as_deref(),
            Some(r#"{"jsonrpc":"2.0"}"#)
        );
        assert_eq!(extract_query_payload(query, "missing"), None);
    }

    #[test]
    fn test_plus_and_leading_question_mark() {
        let pairs = parse_query("?name=John+Smith&flag");
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "John Smith".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_duplicate_keys_resolve_the_same_way() {
        let query = "q=first&a=1&q=second&a=2";
        assert_eq!(extract_query_payload(query, "q").as_deref(), Some("second"));
        assert_eq!(
            ambient_from_query(query, "q").get("a"),
            Some(&Value::String("2".into()))
        );
    }

    #[test]
    fn test_ambient_excludes_payload_key() {
        let ambient = ambient_from_query("q=%5B%5D&a=1&a=2", "q");
        assert_eq!(ambient.len(), 1);
        assert_eq!(ambient.get("a"), Some(&Value::String("2".into())));
    }
}
