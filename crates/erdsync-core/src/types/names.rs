use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

const NBSP: char = '\u{00A0}';

/// Characters that would break a quoted name or a relationship line.
fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '|')
}

/// Characters a bare field-name token may not contain. Colons and commas
/// separate labels and key lists; `%` and `/` open comments.
fn is_reserved_in_field(c: char) -> bool {
    is_delimiter(c) || matches!(c, '"' | ':' | ',' | '%' | '/')
}

/// An entity name that can always be quoted in diagram text.
///
/// Construction replaces non-breaking spaces with regular spaces and trims.
/// Double quotes become single quotes, braces and pipes become underscores,
/// and line breaks become spaces. Inner spaces are kept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Creates a new `EntityName`, sanitizing it and rejecting empty input.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ModelError> {
        let cleaned: String = s
            .as_ref()
            .chars()
            .map(|c| match c {
                NBSP | '\r' | '\n' => ' ',
                '"' => '\'',
                c if is_delimiter(c) => '_',
                c => c,
            })
            .collect();
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyEntityName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for uniqueness checks.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

/// A field name safe to emit unquoted in diagram text.
///
/// Non-breaking spaces are normalized and the result trimmed; any remaining
/// whitespace run becomes a single underscore. Quotes, braces, pipes,
/// colons, commas, `%` and `/` are replaced with underscores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Creates a new `FieldName`, sanitizing it and rejecting empty input.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ModelError> {
        let normalized = s.as_ref().replace(NBSP, " ");
        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyFieldName);
        }

        let mut out = String::with_capacity(trimmed.len());
        let mut in_space = false;
        for c in trimmed.chars() {
            if c.is_whitespace() {
                if !in_space {
                    out.push('_');
                }
                in_space = true;
                continue;
            }
            in_space = false;
            if is_reserved_in_field(c) {
                out.push('_');
            } else {
                out.push(c);
            }
        }
        Ok(Self(out))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for uniqueness checks.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

/// Normalizes a free-text description for emission inside double quotes.
///
/// Line breaks collapse to a single space and double quotes become single
/// quotes. Returns `None` when nothing but whitespace remains.
pub fn sanitize_description(s: &str) -> Option<String> {
    let unified = s.replace("\r\n", " ").replace(['\r', '\n'], " ");
    let cleaned = unified.replace('"', "'");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

macro_rules! string_newtype_impls {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for String {
            fn from(n: $name) -> String {
                n.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_newtype_impls!(EntityName);
string_newtype_impls!(FieldName);
