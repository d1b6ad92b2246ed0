use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::work::WorkItemDraft;
use crate::error::{AppError, AppResult};

/// Rejects a missing or whitespace-only provider reply.
pub fn require_content(content: Option<String>) -> AppResult<String> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::EmptyResponse),
    }
}

/// Removes a markdown code fence wrapped around the payload, if any.
pub fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // single-line fence: drop the info string, e.g. "```json[...]```"
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub fn decode_json<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|err| AppError::MalformedResponse {
        reason: err.to_string(),
        raw: raw.to_string(),
    })
}

/// Decodes work item drafts, accepting either an array or a single object.
///
/// Only the JSON shape is checked here; field types are judged per record later.
pub fn decode_drafts(raw: &str) -> AppResult<Vec<WorkItemDraft>> {
    let malformed = |reason: String| AppError::MalformedResponse {
        reason,
        raw: raw.to_string(),
    };

    let items = match decode_json::<Value>(raw)? {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(malformed(format!(
                "expected a JSON array of work items, got {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(malformed(format!(
                    "work item {} is {}, not an object",
                    index + 1,
                    json_kind(&item)
                )));
            }
            serde_json::from_value(item)
                .map_err(|err| malformed(format!("work item {}: {err}", index + 1)))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strips_language_tagged_fence() {
        let raw = "```json\n[{\"title\":\"A\"}]\n```";
        assert_eq!(strip_code_fences(raw), "[{\"title\":\"A\"}]");
    }

    #[test]
    fn strips_bare_and_single_line_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fences("```json[1]```"), "[1]");
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
    }

    #[test]
    fn fenced_and_unfenced_decode_identically() {
        let inner = r#"[{"title":"배포","priority":"urgent","tags":["ops"]}]"#;
        let fenced = format!("```json\n{inner}\n```");
        assert_eq!(decode_drafts(inner).unwrap(), decode_drafts(&fenced).unwrap());
    }

    #[test]
    fn single_object_becomes_one_element_list() {
        let drafts = decode_drafts(r#"{"title":"Write docs","category":"documentation"}"#).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, Some(json!("Write docs")));
        assert_eq!(drafts[0].category, Some(json!("documentation")));
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(decode_drafts("[]").unwrap().is_empty());
    }

    #[test]
    fn null_hours_are_absent() {
        let drafts = decode_drafts(r#"[{"title":"A","estimated_hours":null}]"#).unwrap();
        assert_eq!(drafts[0].estimated_hours, None);
    }

    #[test]
    fn prose_is_malformed_and_keeps_raw_text() {
        let raw = "I could not find any work items in that text.";
        let error = decode_drafts(raw).unwrap_err();
        assert!(matches!(error, AppError::MalformedResponse { .. }));
        assert_eq!(error.raw_response(), Some(raw));
    }

    #[test]
    fn scalar_and_non_object_items_are_malformed() {
        assert!(matches!(
            decode_drafts("42"),
            Err(AppError::MalformedResponse { .. })
        ));
        assert!(matches!(
            decode_drafts(r#"[{"title":"A"}, "B"]"#),
            Err(AppError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn mistyped_field_keeps_sibling_records() {
        let drafts = decode_drafts(
            r#"[{"title":"Login fix","status":"completed"},{"title":"Payments","estimated_hours":"3"}]"#,
        )
        .unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, Some(json!("Login fix")));
        assert_eq!(drafts[1].estimated_hours, Some(json!("3")));
    }

    #[test]
    fn blank_content_is_empty_response() {
        assert!(matches!(require_content(None), Err(AppError::EmptyResponse)));
        assert!(matches!(
            require_content(Some(" \n ".to_string())),
            Err(AppError::EmptyResponse)
        ));
        assert_eq!(require_content(Some("[]".to_string())).unwrap(), "[]");
    }
}
