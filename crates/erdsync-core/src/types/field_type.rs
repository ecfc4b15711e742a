use std::fmt;

use serde::{Deserialize, Serialize};

/// Column type of a field.
///
/// The set is closed: diagram text with an unrecognized type token is
/// classified as [`FieldType::String`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Text,
    Int,
    Float,
    Number,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Timestamp,
    Json,
    Jsonb,
    Uuid,
    Enum,
    Phone,
    Email,
}

impl FieldType {
    /// Every type, in declaration order.
    pub const ALL: [FieldType; 16] = [
        Self::String,
        Self::Text,
        Self::Int,
        Self::Float,
        Self::Number,
        Self::Decimal,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Timestamp,
        Self::Json,
        Self::Jsonb,
        Self::Uuid,
        Self::Enum,
        Self::Phone,
        Self::Email,
    ];

    /// Canonical spelling used in diagram text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Uuid => "uuid",
            Self::Enum => "enum",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }

    /// Classifies a type token from diagram text.
    ///
    /// Matching is case-insensitive, a trailing `(...)` or `[]` suffix is
    /// ignored, and common SQL spellings map onto the closed set. Anything
    /// else falls back to `String`.
    pub fn from_dsl(token: &str) -> Self {
        let base = token
            .split(['(', '['])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match base.as_str() {
            "string" | "varchar" | "char" | "character" | "nvarchar" => Self::String,
            "text" | "longtext" | "mediumtext" | "clob" => Self::Text,
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "serial" | "bigserial"
            | "long" => Self::Int,
            "float" | "double" | "real" => Self::Float,
            "number" | "numeric" => Self::Number,
            "decimal" | "money" => Self::Decimal,
            "boolean" | "bool" | "bit" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "timestamp" | "timestamptz" | "time" => Self::Timestamp,
            "json" => Self::Json,
            "jsonb" => Self::Jsonb,
            "uuid" | "guid" => Self::Uuid,
            "enum" => Self::Enum,
            "phone" => Self::Phone,
            "email" => Self::Email,
            other => {
                tracing::trace!(token = other, "unrecognized field type, using string");
                Self::String
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_classify_to_themselves() {
        for ft in FieldType::ALL {
            assert_eq!(FieldType::from_dsl(ft.as_str()), ft, "for {ft}");
        }
    }

    #[test]
    fn synonyms() {
        let cases = [
            ("varchar", FieldType::String),
            ("VARCHAR(255)", FieldType::String),
            ("integer", FieldType::Int),
            ("bigint", FieldType::Int),
            ("bool", FieldType::Boolean),
            ("double", FieldType::Float),
            ("time", FieldType::Timestamp),
            ("decimal(10,2)", FieldType::Decimal),
            ("numeric", FieldType::Number),
            ("guid", FieldType::Uuid),
            ("string[]", FieldType::String),
        ];
        for (token, expected) in cases {
            assert_eq!(FieldType::from_dsl(token), expected, "for {token}");
        }
    }

    #[test]
    fn unknown_falls_back_to_string() {
        assert_eq!(FieldType::from_dsl("weirdtype"), FieldType::String);
        assert_eq!(FieldType::from_dsl(""), FieldType::String);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(FieldType::DateTime.to_string(), "datetime");
        assert_eq!(FieldType::Jsonb.to_string(), "jsonb");
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&FieldType::DateTime).unwrap();
        assert_eq!(json, "\"datetime\"");
        let back: FieldType = serde_json::from_str("\"uuid\"").unwrap();
        assert_eq!(back, FieldType::Uuid);
    }
}
