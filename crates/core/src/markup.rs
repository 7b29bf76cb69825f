//! Rich text content paired with its rendering dialect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Map keys of the canonical markup representation.
pub(crate) const CONTENT_KEY: &str = "content";
pub(crate) const MARKUP_KEY: &str = "markup";

/// Errors raised when decoding markup content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// The named dialect is not one of the supported markup kinds
    #[error("markup kind {0:?} is not supported")]
    UnsupportedMarkup(String),

    /// The `markup` map key holds a non-string value
    #[error("markup map key {key:?} holds a {actual} value")]
    BadMapValue {
        /// The offending key
        key: String,
        /// Type name of the value found under the key
        actual: &'static str,
    },
}

/// A supported markup dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Markup {
    /// Plain text, rendered verbatim
    PlainText,
    /// CommonMark-style Markdown
    Markdown,
}

impl Markup {
    /// Dialect used when none is specified.
    pub fn default_markup() -> Self {
        Markup::PlainText
    }

    /// Whether `name` identifies a supported dialect.
    pub fn is_supported(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    /// Parse a dialect name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PlainText" => Some(Markup::PlainText),
            "Markdown" => Some(Markup::Markdown),
            _ => None,
        }
    }

    /// The canonical name of this dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Markup::PlainText => "PlainText",
            Markup::Markdown => "Markdown",
        }
    }
}

impl std::fmt::Display for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rich text with the dialect it is written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupContent {
    /// The raw text
    pub content: String,

    /// The dialect `content` is written in
    pub markup: Markup,
}

impl MarkupContent {
    /// Create markup content in a given dialect.
    pub fn new(content: impl Into<String>, markup: Markup) -> Self {
        Self {
            content: content.into(),
            markup,
        }
    }

    /// Create plain-text content in the default dialect.
    pub fn from_plain_text(content: impl Into<String>) -> Self {
        Self::new(content, Markup::default_markup())
    }

    /// Canonical map representation, as stored in field values.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        map.insert(CONTENT_KEY.to_string(), Value::String(self.content.clone()));
        map.insert(
            MARKUP_KEY.to_string(),
            Value::String(self.markup.as_str().to_string()),
        );
        map
    }

    /// Rebuild content from its canonical map representation.
    ///
    /// A missing `markup` key falls back to the default dialect; an
    /// unsupported dialect name is rejected.
    pub fn from_map(map: &BTreeMap<String, Value>) -> Result<Self, MarkupError> {
        let content = match map.get(CONTENT_KEY) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        let markup = match map.get(MARKUP_KEY) {
            None | Some(Value::Null) => Markup::default_markup(),
            Some(Value::String(name)) => Markup::from_name(name)
                .ok_or_else(|| MarkupError::UnsupportedMarkup(name.clone()))?,
            Some(other) => {
                return Err(MarkupError::BadMapValue {
                    key: MARKUP_KEY.to_string(),
                    actual: other.type_name(),
                })
            }
        };
        Ok(Self { content, markup })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_round_trip() {
        let mc = MarkupContent::new("# Title", Markup::Markdown);
        let rebuilt = MarkupContent::from_map(&mc.to_map()).unwrap();
        assert_eq!(mc, rebuilt);
    }

    #[test]
    fn missing_markup_defaults_to_plain_text() {
        let mut map = BTreeMap::new();
        map.insert(CONTENT_KEY.to_string(), Value::String("hi".to_string()));
        let mc = MarkupContent::from_map(&map).unwrap();
        assert_eq!(mc.markup, Markup::PlainText);
    }

    #[test]
    fn unsupported_markup_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert(CONTENT_KEY.to_string(), Value::String("hi".to_string()));
        map.insert(MARKUP_KEY.to_string(), Value::String("Textile".to_string()));
        assert_eq!(
            MarkupContent::from_map(&map),
            Err(MarkupError::UnsupportedMarkup("Textile".to_string()))
        );
        assert!(!Markup::is_supported("Textile"));
    }

    #[test]
    fn non_string_markup_key_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert(CONTENT_KEY.to_string(), Value::String("hi".to_string()));
        map.insert(MARKUP_KEY.to_string(), Value::Int(1));
        assert_eq!(
            MarkupContent::from_map(&map),
            Err(MarkupError::BadMapValue {
                key: MARKUP_KEY.to_string(),
                actual: "int",
            })
        );
    }
}
