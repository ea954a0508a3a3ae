//! Strict extraction of the generated dish from model output
//!
//! Models are asked for a bare `{"name": ..., "emoji": ...}` object but often
//! wrap it in prose or code fences. The first well-formed JSON object in the
//! text is used. Anything else is a hard error: the caller never gets a name
//! made up from the input ingredients.

use serde_json::{Map, Value};

use crate::error::ResolveError;

/// Name and emoji produced by the text provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDish {
    pub name: String,
    pub emoji: String,
}

/// Find the first substring that parses as a JSON object
///
/// Each `{` is tried as a start position; the streaming deserializer stops
/// at the end of the first complete value, so trailing prose is ignored and
/// braces inside strings are handled correctly.
pub fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

/// Parse model output into a dish, failing with the raw content on any problem
pub fn parse_dish(content: &str) -> Result<GeneratedDish, ResolveError> {
    let malformed = |reason: &str| ResolveError::MalformedOutput {
        reason: reason.to_string(),
        raw: content.to_string(),
    };

    let object = first_json_object(content).ok_or_else(|| malformed("no JSON object found"))?;

    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = field("name").ok_or_else(|| malformed("missing or empty \"name\""))?;
    let emoji = field("emoji").ok_or_else(|| malformed("missing or empty \"emoji\""))?;

    Ok(GeneratedDish { name, emoji })
}
