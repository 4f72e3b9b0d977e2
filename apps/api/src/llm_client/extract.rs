//! Defensive extraction of structured data from free-text LLM replies.
//!
//! Models are prompted to answer with a bare JSON object but routinely wrap
//! it in prose or code fences. Everything here absorbs that shape variance:
//! extraction scans for a balanced object instead of trusting the whole
//! reply, missing keys resolve to call-site defaults, and numeric fields
//! accept numbers, numeric strings, or qualitative confidence maps.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::llm_client::LlmError;

/// Locates the first balanced JSON object embedded in `raw` and decodes it.
///
/// The scan starts at the first `{` and tracks brace depth, skipping string
/// literals and escapes, so braces inside prose or quoted values don't
/// truncate the object. Fails if no object is present or decoding fails;
/// the raw text is carried in the error for operator diagnosis.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, LlmError> {
    let candidate = find_balanced_object(raw).ok_or_else(|| LlmError::Parse {
        message: "no JSON object found in AI response".to_string(),
        raw: raw.to_string(),
    })?;

    let value: Value = serde_json::from_str(candidate).map_err(|e| LlmError::Parse {
        message: format!("invalid JSON in AI response: {e}"),
        raw: raw.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(LlmError::Parse {
            message: format!("expected a JSON object, got {other}"),
            raw: raw.to_string(),
        }),
    }
}

/// Returns the substring spanning the first balanced `{ ... }` object.
fn find_balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Resolves an expected key to text, substituting `default` when the key is
/// missing or null. Non-string values (the model sometimes nests an object
/// where prose was asked for) are rendered as compact JSON rather than
/// rejected.
pub fn text_field(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A score field as the model may actually return it: a number, a numeric
/// string, or a qualitative confidence map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
    Qualitative { confidence_level: String },
    Other(Value),
}

impl ScoreValue {
    /// Normalizes to a float. Qualitative levels map to fixed anchors
    /// (low 30, moderate 60, high 90); any unrecognized shape is 0.0.
    pub fn normalize(&self) -> f64 {
        match self {
            ScoreValue::Number(n) => *n,
            ScoreValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            ScoreValue::Qualitative { confidence_level } => {
                match confidence_level.to_lowercase().as_str() {
                    "low" => 30.0,
                    "moderate" => 60.0,
                    "high" => 90.0,
                    _ => 0.0,
                }
            }
            ScoreValue::Other(_) => 0.0,
        }
    }
}

/// Resolves an expected key to a float via `ScoreValue` coercion.
/// Missing key → 0.0.
pub fn score_field(map: &Map<String, Value>, key: &str) -> f64 {
    map.get(key)
        .and_then(|v| serde_json::from_value::<ScoreValue>(v.clone()).ok())
        .map(|s| s.normalize())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_extract_json_surrounded_by_prose() {
        let map = extract_json_object("Sure! {\"a\":1} Thanks").unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_extract_json_bare_object() {
        let map = extract_json_object("{\"title\": {\"diagnosis\": \"Flu\"}}").unwrap();
        assert_eq!(map["title"]["diagnosis"], json!("Flu"));
    }

    #[test]
    fn test_extract_json_inside_code_fence() {
        let raw = "```json\n{\"recommendation\": \"rest\"}\n```";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["recommendation"], json!("rest"));
    }

    #[test]
    fn test_extract_json_nested_objects() {
        let raw = "Here you go: {\"preliminary\": {\"symptom\": \"fever\"}, \"notes\": {}} done";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["preliminary"]["symptom"], json!("fever"));
        assert!(map["notes"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_extract_json_braces_inside_string_values() {
        let raw = r#"{"notes": "use {caution} here"} trailing } brace"#;
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["notes"], json!("use {caution} here"));
    }

    #[test]
    fn test_extract_json_escaped_quotes_in_string() {
        let raw = r#"{"notes": "she said \"rest\""}"#;
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["notes"], json!("she said \"rest\""));
    }

    #[test]
    fn test_extract_json_no_object_is_parse_error() {
        let err = extract_json_object("I cannot help with that.").unwrap_err();
        match err {
            LlmError::Parse { raw, .. } => assert_eq!(raw, "I cannot help with that."),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_json_malformed_is_parse_error() {
        let err = extract_json_object("{'title': 'single quotes are not JSON'}").unwrap_err();
        assert!(matches!(err, LlmError::Parse { .. }));
    }

    #[test]
    fn test_extract_json_unterminated_object_is_parse_error() {
        let err = extract_json_object("{\"a\": 1").unwrap_err();
        assert!(matches!(err, LlmError::Parse { .. }));
    }

    #[test]
    fn test_text_field_present() {
        let map = obj(json!({"recommendation": "drink fluids"}));
        assert_eq!(
            text_field(&map, "recommendation", "No recommendation available"),
            "drink fluids"
        );
    }

    #[test]
    fn test_text_field_missing_uses_default() {
        let map = obj(json!({}));
        assert_eq!(
            text_field(&map, "recommendation", "No recommendation available"),
            "No recommendation available"
        );
    }

    #[test]
    fn test_text_field_null_uses_default() {
        let map = obj(json!({"recommendation": null}));
        assert_eq!(
            text_field(&map, "recommendation", "No recommendation available"),
            "No recommendation available"
        );
    }

    #[test]
    fn test_text_field_nested_object_rendered_as_json() {
        let map = obj(json!({"recommendation": {"rest": "two days"}}));
        assert_eq!(
            text_field(&map, "recommendation", "n/a"),
            r#"{"rest":"two days"}"#
        );
    }

    #[test]
    fn test_score_numeric_string() {
        let map = obj(json!({"accuracy": "42"}));
        assert_eq!(score_field(&map, "accuracy"), 42.0);
    }

    #[test]
    fn test_score_float() {
        let map = obj(json!({"accuracy": 37.5}));
        assert_eq!(score_field(&map, "accuracy"), 37.5);
    }

    #[test]
    fn test_score_integer() {
        let map = obj(json!({"accuracy": 80}));
        assert_eq!(score_field(&map, "accuracy"), 80.0);
    }

    #[test]
    fn test_score_confidence_levels() {
        for (level, expected) in [("low", 30.0), ("moderate", 60.0), ("high", 90.0)] {
            let map = obj(json!({"accuracy": {"confidence_level": level}}));
            assert_eq!(score_field(&map, "accuracy"), expected, "level {level}");
        }
    }

    #[test]
    fn test_score_unknown_confidence_is_zero() {
        let map = obj(json!({"accuracy": {"confidence_level": "unknown"}}));
        assert_eq!(score_field(&map, "accuracy"), 0.0);
    }

    #[test]
    fn test_score_map_without_confidence_is_zero() {
        let map = obj(json!({"accuracy": {"estimate": 70}}));
        assert_eq!(score_field(&map, "accuracy"), 0.0);
    }

    #[test]
    fn test_score_missing_key_is_zero() {
        let map = obj(json!({}));
        assert_eq!(score_field(&map, "accuracy"), 0.0);
    }

    #[test]
    fn test_score_non_numeric_string_is_zero() {
        let map = obj(json!({"accuracy": "very high"}));
        assert_eq!(score_field(&map, "accuracy"), 0.0);
    }
}
