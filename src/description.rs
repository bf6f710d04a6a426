//! Formatting of multi-line descriptions.

use itertools::Itertools as _;
use serde_json::Value as JsonValue;

/// Turns an indented multi-line string into a description.
///
/// Leading spaces of every line are removed, then whitespace around the whole
/// string is trimmed.
///
/// ```rust
/// # use strong_graphql::trim_description;
/// let description = trim_description(
///     "
///     Lorem ipsum dolor sit amet,
///     consectetur adipiscing elit.
///     ",
/// );
///
/// assert_eq!(description, "Lorem ipsum dolor sit amet,\nconsectetur adipiscing elit.");
/// ```
#[must_use]
pub fn trim_description(description: &str) -> String {
    description
        .split('\n')
        .map(|line| line.trim_start_matches(' '))
        .join("\n")
        .trim()
        .to_owned()
}

/// Applies [`trim_description()`] to every string stored under a
/// `description` key, at any depth of the provided configuration.
///
/// A new value is returned, and all other entries are copied unchanged.
#[must_use]
pub fn trim_descriptions_in_config(config: JsonValue) -> JsonValue {
    match config {
        JsonValue::Object(entries) => JsonValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        JsonValue::String(s) if key == "description" => {
                            JsonValue::String(trim_description(&s))
                        }
                        v => trim_descriptions_in_config(v),
                    };
                    (key, value)
                })
                .collect(),
        ),
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(trim_descriptions_in_config).collect())
        }
        v => v,
    }
}

/// Trims the provided description, if any, dropping it when nothing remains.
pub(crate) fn trimmed(description: impl AsRef<str>) -> Option<arcstr::ArcStr> {
    let description = trim_description(description.as_ref());
    (!description.is_empty()).then(|| description.into())
}
