//! Best-effort recovery of a JSON object from model output.

use serde_json::{Map, Value};

use crate::error::AnalysisError;

const SNIPPET_CHARS: usize = 200;

/// Parses `raw` as a JSON object.
///
/// Strict parsing is tried first. If that fails (or yields a non-object),
/// the span from the first `{` to the last `}` is parsed instead, which
/// recovers objects wrapped in prose or code fences.
///
/// # Errors
///
/// - [`AnalysisError::NotAnObject`]: valid JSON of another type and no
///   embedded object.
/// - [`AnalysisError::MalformedJson`]: nothing parseable was found.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, AnalysisError> {
    let strict = serde_json::from_str::<Value>(raw.trim());
    if let Ok(Value::Object(map)) = strict {
        return Ok(map);
    }

    if let Some(Value::Object(map)) = brace_span(raw).and_then(|s| serde_json::from_str(s).ok()) {
        tracing::debug!("recovered JSON object from surrounding text");
        return Ok(map);
    }

    if strict.is_ok() {
        return Err(AnalysisError::NotAnObject);
    }
    Err(AnalysisError::MalformedJson {
        snippet: raw.chars().take(SNIPPET_CHARS).collect(),
    })
}

fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
