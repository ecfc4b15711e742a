//! Diagram text to entities.
//!
//! Parsing is line-oriented and forgiving: a line that does not fit is
//! skipped with a [`ParseWarning`] and the rest of the document still
//! counts. Only a missing header, an empty result, or a parser crash reject
//! the text outright.

use std::panic::{self, AssertUnwindSafe};

use erdsync_core::types::{
    Cardinality, Entity, EntityName, Field, FieldName, FieldType, FkReference,
};

use crate::error::{ParseError, ParseWarning, Span, WarningKind};
use crate::lexer::{lines, tokenize_line, SpannedToken};
use crate::resolver::{FkResolver, HeuristicResolver};
use crate::token::Token;

/// The header every diagram starts with.
pub const HEADER: &str = "erDiagram";

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub entities: Vec<Entity>,
    pub warnings: Vec<ParseWarning>,
}

/// Parses diagram text, binding relationships with [`HeuristicResolver`].
///
/// # Errors
///
/// See [`parse_with`].
pub fn parse(source: &str) -> Result<Diagram, ParseError> {
    parse_with(source, &HeuristicResolver)
}

/// Parses diagram text, binding relationships with the given resolver.
///
/// # Errors
///
/// - [`ParseError::MissingHeader`] if the text does not start with `erDiagram`
/// - [`ParseError::NoEntitiesFound`] if nothing declares an entity
/// - [`ParseError::Internal`] if the parser panics
pub fn parse_with<R: FkResolver + ?Sized>(
    source: &str,
    resolver: &R,
) -> Result<Diagram, ParseError> {
    check_header(source)?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut scanner = Scanner::default();
        scanner.scan(source);
        scanner.finish(resolver)
    }));

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(%message, "diagram parser panicked");
            Err(ParseError::Internal { message })
        }
    }
}

/// After leading whitespace, the text must open with the header word.
fn check_header(source: &str) -> Result<(), ParseError> {
    let rest = source.trim_start();
    let start = source.len() - rest.len();
    let found = rest.find(char::is_whitespace).unwrap_or(rest.len());
    if &rest[..found] == HEADER {
        Ok(())
    } else {
        Err(ParseError::MissingHeader {
            span: Span::new(start, start + found),
        })
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Outside,
    /// Inside `name { ... }`. `entity` is `None` when the block's name was
    /// unusable; its lines are consumed and dropped.
    Inside {
        entity: Option<usize>,
        line: usize,
        span: Span,
    },
}

#[derive(Debug)]
struct PendingRelationship {
    from: EntityName,
    to: EntityName,
    cardinality: Cardinality,
    label: Option<String>,
    line: usize,
    span: Span,
}

#[derive(Debug, Default)]
struct Scanner {
    state: State,
    entities: Vec<Entity>,
    pending: Vec<PendingRelationship>,
    warnings: Vec<ParseWarning>,
}

impl Scanner {
    fn scan(&mut self, source: &str) {
        for (line_no, offset, line) in lines(source) {
            if line.trim().is_empty() {
                continue;
            }
            let line_span = Span::new(offset, offset + line.len());
            let tokens = match tokenize_line(line, offset) {
                Ok(tokens) => tokens,
                Err(span) => {
                    tracing::debug!(line = line_no, %span, "skipping malformed line");
                    self.warn(line_no, line_span, WarningKind::MalformedLine);
                    continue;
                }
            };
            match tokens.first() {
                None => continue,
                Some(first) if first.token == Token::Header => continue,
                Some(_) => {}
            }

            let block = match self.state {
                State::Outside => None,
                State::Inside { entity, .. } => Some(entity),
            };
            match block {
                None => self.outside(line_no, line_span, &tokens),
                Some(entity) => self.inside(entity, line_no, line_span, &tokens),
            }
        }

        if let State::Inside { entity, line, span } = std::mem::take(&mut self.state) {
            let name = entity
                .map(|i| self.entities[i].name.to_string())
                .unwrap_or_default();
            self.warn(line, span, WarningKind::UnclosedBlock { entity: name });
        }
    }

    fn outside(&mut self, line: usize, span: Span, tokens: &[SpannedToken<'_>]) {
        match tokens {
            [name] if is_name(name) => {
                if let Some(name) = self.entity_name(line, span, name) {
                    self.declare(name, line, span);
                }
            }
            [name, open] if is_name(name) && open.token == Token::LBrace => {
                let entity = self
                    .entity_name(line, span, name)
                    .and_then(|name| self.declare(name, line, span));
                self.state = State::Inside { entity, line, span };
            }
            [name, open, close]
                if is_name(name) && open.token == Token::LBrace && close.token == Token::RBrace =>
            {
                if let Some(name) = self.entity_name(line, span, name) {
                    self.declare(name, line, span);
                }
            }
            [from, connector, to, rest @ ..]
                if is_name(from) && connector.token == Token::Relationship && is_name(to) =>
            {
                let label = match rest {
                    [] => None,
                    [colon, label @ ..] if colon.token == Token::Colon => label_text(label),
                    _ => {
                        self.warn(line, span, WarningKind::UnrecognizedStatement);
                        return;
                    }
                };
                let (Some(from), Some(to)) = (
                    self.entity_name(line, span, from),
                    self.entity_name(line, span, to),
                ) else {
                    return;
                };
                let Some(cardinality) = Cardinality::from_symbol(connector.text) else {
                    self.warn(line, span, WarningKind::UnrecognizedStatement);
                    return;
                };
                self.pending.push(PendingRelationship {
                    from,
                    to,
                    cardinality,
                    label,
                    line,
                    span,
                });
            }
            _ => self.warn(line, span, WarningKind::UnrecognizedStatement),
        }
    }

    fn inside(
        &mut self,
        entity: Option<usize>,
        line: usize,
        span: Span,
        tokens: &[SpannedToken<'_>],
    ) {
        let (type_token, name_token, rest) = match tokens {
            [close] if close.token == Token::RBrace => {
                self.state = State::Outside;
                return;
            }
            [ty, name, rest @ ..] if ty.token.is_word() && name.token.is_word() => (ty, name, rest),
            _ => {
                self.warn(line, span, WarningKind::InvalidFieldLine);
                return;
            }
        };

        let mut is_pk = false;
        let mut is_fk = false;
        let mut description = None;
        for token in rest {
            match token.token {
                Token::Ident => match token.text.to_ascii_uppercase().as_str() {
                    "PK" => is_pk = true,
                    "FK" => is_fk = true,
                    "UK" => {}
                    other => tracing::trace!(line, key = other, "ignoring unknown key marker"),
                },
                Token::Comma => {}
                Token::StringLiteral => description = Some(token.unquoted()),
                _ => {
                    self.warn(line, span, WarningKind::InvalidFieldLine);
                    return;
                }
            }
        }

        let Some(index) = entity else {
            return;
        };
        let Ok(name) = FieldName::new(name_token.text) else {
            self.warn(line, span, WarningKind::InvalidFieldLine);
            return;
        };
        let owner = &mut self.entities[index];
        if owner.field(name.as_str()).is_some() {
            let kind = WarningKind::DuplicateField {
                entity: owner.name.to_string(),
                field: name.to_string(),
            };
            self.warn(line, span, kind);
            return;
        }

        let mut field = Field::new(name, FieldType::from_dsl(type_token.text));
        field.is_pk = is_pk;
        if is_fk {
            field.mark_foreign_key();
        }
        field.set_description(description);
        owner.fields.push(field);
    }

    fn entity_name(&mut self, line: usize, span: Span, token: &SpannedToken<'_>) -> Option<EntityName> {
        match EntityName::new(token.unquoted()) {
            Ok(name) => Some(name),
            Err(_) => {
                self.warn(line, span, WarningKind::InvalidEntityName);
                None
            }
        }
    }

    /// Returns the index of the entity with this exact name, creating it if
    /// new. A name that differs from an existing one only by case is
    /// refused with a warning.
    fn declare(&mut self, name: EntityName, line: usize, span: Span) -> Option<usize> {
        if let Some(index) = self.entities.iter().position(|e| e.name == name) {
            return Some(index);
        }
        if let Some(existing) = self.entities.iter().find(|e| e.name.matches(name.as_str())) {
            let kind = WarningKind::DuplicateEntity {
                name: name.to_string(),
                existing: existing.name.to_string(),
            };
            self.warn(line, span, kind);
            return None;
        }
        self.entities.push(Entity::new(name));
        Some(self.entities.len() - 1)
    }

    fn warn(&mut self, line: usize, span: Span, kind: WarningKind) {
        self.warnings.push(ParseWarning { line, span, kind });
    }

    fn finish<R: FkResolver + ?Sized>(mut self, resolver: &R) -> Result<Diagram, ParseError> {
        if self.entities.is_empty() {
            return Err(ParseError::NoEntitiesFound);
        }

        for relationship in std::mem::take(&mut self.pending) {
            self.bind(relationship, resolver);
        }

        tracing::debug!(
            entities = self.entities.len(),
            warnings = self.warnings.len(),
            "parsed diagram"
        );
        Ok(Diagram {
            entities: self.entities,
            warnings: self.warnings,
        })
    }

    fn bind<R: FkResolver + ?Sized>(&mut self, rel: PendingRelationship, resolver: &R) {
        let position = |name: &EntityName| self.entities.iter().position(|e| &e.name == name);
        let (from, to) = match (position(&rel.from), position(&rel.to)) {
            (Some(from), Some(to)) => (from, to),
            (from, _) => {
                let missing = if from.is_none() { rel.from } else { rel.to };
                self.warn(
                    rel.line,
                    rel.span,
                    WarningKind::UnknownEntity {
                        name: missing.to_string(),
                    },
                );
                return;
            }
        };

        let target = &self.entities[to];
        let target_id = target.id.clone();
        let target_pk = target.primary_key().map(|f| f.id.clone());
        let Some(field_index) = resolver.resolve(&self.entities[from], target, rel.label.as_deref())
        else {
            let kind = WarningKind::UnboundRelationship {
                from: rel.from.to_string(),
                to: rel.to.to_string(),
            };
            self.warn(rel.line, rel.span, kind);
            return;
        };

        let Some(field) = self.entities[from].fields.get_mut(field_index) else {
            return;
        };
        let mut reference = FkReference::to(target_id, target_pk, rel.cardinality);
        if let Some(label) = rel.label.filter(|l| !field.name.matches(l)) {
            reference = reference.with_label(label);
        }
        field.is_fk = true;
        field.fk_reference = Some(reference);
    }
}

fn is_name(token: &SpannedToken<'_>) -> bool {
    matches!(token.token, Token::Ident | Token::StringLiteral)
}

/// Text after the `:` of a relationship line. A single quoted label is
/// unquoted; bare words are joined with single spaces.
fn label_text(tokens: &[SpannedToken<'_>]) -> Option<String> {
    let text = match tokens {
        [single] => single.unquoted().to_string(),
        _ => tokens
            .iter()
            .map(SpannedToken::unquoted)
            .collect::<Vec<_>>()
            .join(" "),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
