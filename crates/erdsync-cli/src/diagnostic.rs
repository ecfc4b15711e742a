use erdsync_dsl::{ParseError, ParseWarning, Span, WarningKind};
use miette::{Diagnostic, NamedSource, SourceSpan};

/// A rejected diagram, rendered by miette with the offending source.
///
/// The module-level `#[allow(unused_assignments)]` in main.rs is required
/// because miette's derive macro generates assignment patterns that rustc
/// flags as unused.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(severity(Error))]
pub struct DiagramDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

/// A skipped line, rendered like [`DiagramDiagnostic`] but as a warning.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(severity(Warning))]
pub struct DiagramWarning {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

fn source_span(span: Span) -> SourceSpan {
    (span.start, span.len()).into()
}

/// Convert a [`ParseError`] into a diagnostic with a label and a suggestion.
pub fn parse_error_to_diagnostic(
    error: &ParseError,
    source: &str,
    filename: &str,
) -> DiagramDiagnostic {
    let src = NamedSource::new(filename, source.to_string());
    let (span, label) = match error {
        ParseError::MissingHeader { span } => (source_span(*span), "expected 'erDiagram'"),
        ParseError::NoEntitiesFound => ((0, source.len().min(9)).into(), "nothing declared"),
        _ => ((0, 0).into(), "parser stopped here"),
    };
    DiagramDiagnostic {
        src,
        span,
        message: error.title().to_string(),
        label: label.to_string(),
        suggestion: Some(error.description()),
    }
}

/// A ready-to-print report for a rejected diagram.
pub fn parse_error_report(error: &ParseError, source: &str, filename: &str) -> miette::Report {
    miette::Report::new(parse_error_to_diagnostic(error, source, filename))
}

/// Convert a [`ParseWarning`] into a warning diagnostic.
pub fn warning_to_diagnostic(warning: &ParseWarning, source: &str, filename: &str) -> DiagramWarning {
    let label = match &warning.kind {
        WarningKind::MalformedLine => "cannot be tokenized",
        WarningKind::UnrecognizedStatement => "not a block, declaration or relationship",
        WarningKind::InvalidFieldLine => "not a field definition",
        WarningKind::InvalidEntityName => "empty name",
        WarningKind::DuplicateEntity { .. } => "entity already declared",
        WarningKind::DuplicateField { .. } => "already defined above",
        WarningKind::UnclosedBlock { .. } => "opened here",
        WarningKind::UnknownEntity { .. } => "unknown entity",
        WarningKind::UnboundRelationship { .. } => "no FK field to bind",
        _ => "skipped",
    };
    DiagramWarning {
        src: NamedSource::new(filename, source.to_string()),
        span: source_span(warning.span),
        message: format!("line {}: {}", warning.line, warning.kind),
        label: label.to_string(),
        suggestion: warning.kind.help().map(str::to_string),
    }
}

/// Render all warnings for a file using miette.
pub fn render_warnings(
    warnings: &[ParseWarning],
    source: &str,
    filename: &str,
) -> Vec<miette::Report> {
    warnings
        .iter()
        .map(|w| miette::Report::new(warning_to_diagnostic(w, source, filename)))
        .collect()
}

/// One JSON object per warning, for `--format json`.
pub fn warnings_to_json(warnings: &[ParseWarning]) -> Vec<serde_json::Value> {
    warnings
        .iter()
        .map(|w| {
            serde_json::json!({
                "line": w.line,
                "start": w.span.start,
                "end": w.span.end,
                "message": w.kind.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_diagnostic() {
        let source = "graph TD";
        let err = erdsync_dsl::parse(source).unwrap_err();
        let diag = parse_error_to_diagnostic(&err, source, "x.mmd");
        assert_eq!(diag.message, "Missing diagram header");
        assert_eq!(diag.span, SourceSpan::from((0, 5)));
        assert!(diag.suggestion.as_deref().unwrap().contains("erDiagram"));
    }

    #[test]
    fn no_entities_diagnostic() {
        let diag = parse_error_to_diagnostic(&ParseError::NoEntitiesFound, "erDiagram", "x.mmd");
        assert_eq!(diag.message, "No entities found");
        assert_eq!(diag.label, "nothing declared");
    }

    #[test]
    fn internal_diagnostic_keeps_message() {
        let err = ParseError::Internal {
            message: "boom".into(),
        };
        let diag = parse_error_to_diagnostic(&err, "erDiagram", "x.mmd");
        assert!(diag.suggestion.unwrap().contains("boom"));
    }

    #[test]
    fn warning_diagnostic_points_at_line() {
        let source = "erDiagram\nA {\n int id\n int ID\n}\n";
        let diagram = erdsync_dsl::parse(source).unwrap();
        let diag = warning_to_diagnostic(&diagram.warnings[0], source, "x.mmd");
        assert!(diag.message.starts_with("line 4:"));
        assert_eq!(diag.label, "already defined above");
        assert_eq!(diag.span.offset(), source.find(" int ID").unwrap());
    }

    #[test]
    fn render_warnings_one_report_each() {
        let source = "erDiagram\nA {\n ???\n";
        let diagram = erdsync_dsl::parse(source).unwrap();
        let reports = render_warnings(&diagram.warnings, source, "x.mmd");
        assert_eq!(reports.len(), diagram.warnings.len());
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn warnings_json_shape() {
        let source = "erDiagram\nA\nA ||--|| B\n";
        let diagram = erdsync_dsl::parse(source).unwrap();
        let json = warnings_to_json(&diagram.warnings);
        assert_eq!(json[0]["line"], 3);
        assert!(json[0]["message"].as_str().unwrap().contains("'B'"));
    }
}
