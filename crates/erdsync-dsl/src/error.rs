use std::fmt;

/// A byte-offset span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span from start (inclusive) to end (exclusive).
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Coarse classification of a [`ParseError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    MissingHeader,
    NoEntitiesFound,
    Internal,
}

impl ParseErrorKind {
    /// Machine-readable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::NoEntitiesFound => "no_entities_found",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that reject a diagram as a whole.
///
/// Anything more local than this (a bad line, an unknown entity in a
/// relationship) is reported as a [`ParseWarning`] and parsing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The first non-blank content is not the `erDiagram` header.
    MissingHeader { span: Span },

    /// The header was present but nothing declared an entity.
    NoEntitiesFound,

    /// The parser itself failed; the message is carried for display.
    Internal { message: String },
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::MissingHeader { .. } => ParseErrorKind::MissingHeader,
            Self::NoEntitiesFound => ParseErrorKind::NoEntitiesFound,
            Self::Internal { .. } => ParseErrorKind::Internal,
        }
    }

    /// Short heading suitable for an error banner.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingHeader { .. } => "Missing diagram header",
            Self::NoEntitiesFound => "No entities found",
            Self::Internal { .. } => "Parser failure",
        }
    }

    /// Longer explanation with a hint about how to fix the text.
    pub fn description(&self) -> String {
        match self {
            Self::MissingHeader { .. } => {
                "The diagram must start with 'erDiagram' on its own line.".to_string()
            }
            Self::NoEntitiesFound => "Declare at least one entity, for example \
                 'Users { int id PK }'."
                .to_string(),
            Self::Internal { message } => format!("The parser stopped unexpectedly: {message}"),
        }
    }

    /// Source location, when the error points at one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::MissingHeader { span } => Some(*span),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader { span } => {
                write!(f, "expected 'erDiagram' header at {span}")
            }
            Self::NoEntitiesFound => write!(f, "diagram declares no entities"),
            Self::Internal { message } => write!(f, "internal parser error: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A recoverable problem found while parsing. The offending line is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// One-based line number.
    pub line: usize,
    pub span: Span,
    pub kind: WarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WarningKind {
    /// The line contains characters no token rule accepts.
    MalformedLine,

    /// Outside a block, the line is not a declaration, block opener or relationship.
    UnrecognizedStatement,

    /// Inside a block, the line is not `<type> <name> [keys] ["description"]`.
    InvalidFieldLine,

    /// An entity name that is empty once sanitized.
    InvalidEntityName,

    /// A block or declaration whose name differs from an existing entity
    /// only by case. Its fields are dropped.
    DuplicateEntity { name: String, existing: String },

    /// A field name already present in the same entity.
    DuplicateField { entity: String, field: String },

    /// The input ended while a block was still open.
    UnclosedBlock { entity: String },

    /// A relationship names an entity that was never declared.
    UnknownEntity { name: String },

    /// No foreign-key field could be bound to the relationship.
    UnboundRelationship { from: String, to: String },
}

impl WarningKind {
    /// Suggested fix, where one is obvious.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::MalformedLine => Some("check for unbalanced quotes or stray characters"),
            Self::InvalidFieldLine => Some("fields are written as: type name [PK|FK] [\"description\"]"),
            Self::UnclosedBlock { .. } => Some("add a closing '}'"),
            Self::DuplicateEntity { .. } => {
                Some("entity names are case-insensitive; reuse the existing spelling")
            }
            Self::UnboundRelationship { .. } => {
                Some("mark the referencing field with FK so the relationship can bind to it")
            }
            _ => None,
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine => write!(f, "malformed line"),
            Self::UnrecognizedStatement => write!(f, "unrecognized statement"),
            Self::InvalidFieldLine => write!(f, "invalid field line"),
            Self::InvalidEntityName => write!(f, "entity name is empty"),
            Self::DuplicateEntity { name, existing } => {
                write!(f, "entity '{name}' clashes with '{existing}'")
            }
            Self::DuplicateField { entity, field } => {
                write!(f, "duplicate field '{field}' in entity '{entity}'")
            }
            Self::UnclosedBlock { entity } => {
                write!(f, "block for entity '{entity}' is never closed")
            }
            Self::UnknownEntity { name } => {
                write!(f, "relationship refers to unknown entity '{name}'")
            }
            Self::UnboundRelationship { from, to } => write!(
                f,
                "relationship '{from}' -> '{to}' has no foreign-key field to bind to"
            ),
        }
    }
}
