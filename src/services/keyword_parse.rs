//! Turns raw model output into a [`KeywordSet`].
//!
//! Models wrap JSON in prose or code fences, so the first balanced object is
//! located before parsing. Past that point the shape is checked strictly: all
//! three category keys must be present and hold arrays.

use serde_json::{Map, Value};

use crate::models::{KeywordCategory, KeywordSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No JSON object found in model output")]
    NoJsonObject,

    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Model output is missing the {0} key")]
    MissingKey(KeywordCategory),

    #[error("Model output field {0} is not a list")]
    NotAList(KeywordCategory),

    #[error("Model output contained no usable keywords")]
    Empty,
}

/// Returns the first balanced `{...}` substring, ignoring braces inside
/// JSON string literals.
#[must_use]
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn coerce_entry(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn take_category(
    object: &Map<String, Value>,
    category: KeywordCategory,
    max_len: usize,
) -> Result<Vec<String>, ParseError> {
    let value = object
        .get(category.as_str())
        .ok_or(ParseError::MissingKey(category))?;

    let items = value.as_array().ok_or(ParseError::NotAList(category))?;

    Ok(items
        .iter()
        .filter_map(coerce_entry)
        .filter(|k| !k.is_empty() && k.chars().count() <= max_len)
        .collect())
}

/// Parses model output into a sanitized keyword set.
pub fn parse_keyword_response(raw: &str, max_len: usize) -> Result<KeywordSet, ParseError> {
    let json = extract_json_object(raw).ok_or(ParseError::NoJsonObject)?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ParseError::InvalidJson("top-level value is not an object".to_string()))?;

    let mut set = KeywordSet::default();
    for category in KeywordCategory::ALL {
        *set.get_mut(category) = take_category(object, category, max_len)?;
    }

    if set.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(set)
}
