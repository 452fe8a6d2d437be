//! Recovery of a well-formed record from loosely-structured model output,
//! and the falsy-field sweep before persistence.
//!
//! The parse is an ordered pipeline of refinements: trim, fence-strip,
//! brace-slice, strict parse. Each step narrows the text; only the final
//! parse decides success. There is deliberately no special case for
//! "no braces found" — that input flows on and fails the strict parse like
//! any other garbage.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

/// Parses raw model output into a field mapping. On any parse failure the
/// record is empty, the unmodified output is kept on disk for inspection,
/// and a warning is logged; this never errors to the caller.
///
/// No field-set validation happens on success: extra or missing keys pass
/// through as-is.
pub fn parse_record(raw: &str, message_id: &str, debug_dir: &Path) -> Map<String, Value> {
    let content = raw.trim();

    // Strip markdown fences if present (```json ... ```). The language hint
    // survives this step and falls away with the brace slice below.
    let content = if content.starts_with("```") {
        content.trim_matches(|c: char| c == '`' || c.is_whitespace())
    } else {
        content
    };

    // In case the model added prose around the JSON, slice to the first '{'
    // and the last '}'.
    let content = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start <= end => &content[start..=end],
        _ => content,
    };

    match serde_json::from_str::<Map<String, Value>>(content) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(
                "Model output for message {message_id} was not valid JSON ({e}); raw output saved"
            );
            dump_raw_output(debug_dir, message_id, raw);
            Map::new()
        }
    }
}

fn dump_raw_output(debug_dir: &Path, message_id: &str, raw: &str) {
    let write = fs::create_dir_all(debug_dir).and_then(|_| {
        fs::write(
            debug_dir.join(format!("raw_model_output_{message_id}.txt")),
            raw,
        )
    });
    if let Err(e) = write {
        tracing::warn!("Could not save raw model output for message {message_id}: {e}");
    }
}

/// Returns a copy of the record with every falsy-valued field removed.
/// The store rejects empty values for its constrained fields; omission is
/// how "unknown" is signalled. Unknown field names are kept.
pub fn sanitize_record(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .filter(|(_, value)| !is_falsy(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn parse(raw: &str) -> Map<String, Value> {
        let dir = TempDir::new().unwrap();
        parse_record(raw, "test-message", dir.path())
    }

    #[test]
    fn test_clean_json_parses_directly() {
        let raw = "{\"Company\": \"Acme\", \"Round\": \"Seed\"}";
        let direct: Map<String, Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(parse(raw), direct);
    }

    #[test]
    fn test_fenced_json() {
        let record = parse("```json\n{\"Company\":\"Acme\"}\n```");
        assert_eq!(record.get("Company"), Some(&json!("Acme")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_fence_without_language_hint() {
        let record = parse("```\n{\"Company\":\"Acme\"}\n```");
        assert_eq!(record.get("Company"), Some(&json!("Acme")));
    }

    #[test]
    fn test_prose_wrapped_json() {
        let record = parse("Here is the data: {\"Company\":\"Acme\"} Let me know!");
        assert_eq!(record.get("Company"), Some(&json!("Acme")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let record = parse("{\"foo\": \"bar\"}");
        assert_eq!(record.get("foo"), Some(&json!("bar")));
    }

    #[test]
    fn test_invalid_output_yields_empty_record_and_side_channel() {
        let dir = TempDir::new().unwrap();
        let record = parse_record("not json at all", "m-42", dir.path());
        assert!(record.is_empty());

        let dumped = fs::read_to_string(dir.path().join("raw_model_output_m-42.txt")).unwrap();
        assert_eq!(dumped, "not json at all");
    }

    #[test]
    fn test_braceless_input_takes_ordinary_failure_path() {
        let dir = TempDir::new().unwrap();
        let record = parse_record("```\nnothing structured here\n```", "m-43", dir.path());
        assert!(record.is_empty());
        assert!(dir.path().join("raw_model_output_m-43.txt").exists());
    }

    #[test]
    fn test_sanitize_drops_falsy_fields() {
        let record: Map<String, Value> = serde_json::from_value(json!({
            "Company": "Acme",
            "Founder Name": "",
            "Deck": null,
            "Raise Amount": 0,
            "Deck Links": [],
            "Call Notes": {},
            "Active": false,
            "Employees": 12,
        }))
        .unwrap();

        let sanitized = sanitize_record(&record);
        assert_eq!(sanitized.get("Company"), Some(&json!("Acme")));
        assert_eq!(sanitized.get("Employees"), Some(&json!(12)));
        assert_eq!(sanitized.len(), 2);

        // The input record is untouched.
        assert_eq!(record.len(), 8);
    }

    #[test]
    fn test_sanitize_keeps_unknown_truthy_fields() {
        let record: Map<String, Value> =
            serde_json::from_value(json!({"not a known field": "kept"})).unwrap();
        let sanitized = sanitize_record(&record);
        assert_eq!(sanitized.get("not a known field"), Some(&json!("kept")));
    }
}
