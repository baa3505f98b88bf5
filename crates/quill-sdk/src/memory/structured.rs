//! Recovering structured records from free-form provider output.
//!
//! Providers are asked for a bare JSON object but often wrap it in code
//! fences or prose. [`parse_or_fallback`] strips fences, takes the first
//! well-formed JSON object in the text and decodes it. Anything else yields
//! the caller's fallback record.

use quill_core::Error;
use serde::de::DeserializeOwned;
use tracing::warn;

/// A decoded record and whether it came from the fallback
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub used_fallback: bool,
}

/// Decode `raw` as `T`, or use `fallback()` when it holds no usable object
pub fn parse_or_fallback<T, F>(raw: &str, what: &str, fallback: F) -> Parsed<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match extract_object(raw) {
        Ok(value) => Parsed {
            value,
            used_fallback: false,
        },
        Err(e) => {
            warn!(record = what, error = %e, "Using fallback record");
            Parsed {
                value: fallback(),
                used_fallback: true,
            }
        }
    }
}

/// Decode the first well-formed JSON object in `raw`
pub fn extract_object<T: DeserializeOwned>(raw: &str) -> quill_core::Result<T> {
    let cleaned = strip_code_fences(raw);
    let text = cleaned.trim();
    if text.is_empty() {
        return Err(Error::MalformedOutput("empty response".into()));
    }

    for (start, _) in text.match_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<serde_json::Value>();
        if let Some(Ok(value)) = stream.next() {
            if value.is_object() {
                return serde_json::from_value(value)
                    .map_err(|e| Error::MalformedOutput(e.to_string()));
            }
        }
    }

    Err(Error::MalformedOutput("no JSON object found".into()))
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
}
