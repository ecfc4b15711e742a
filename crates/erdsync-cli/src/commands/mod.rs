pub mod completions;
pub mod export;
pub mod fmt;
pub mod generate;
pub mod parse;
pub mod watch;

use std::path::{Path, PathBuf};

use erdsync_dsl::{FkResolver, HeuristicResolver, LabelResolver, ParseWarning};

use crate::diagnostic;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Discover diagram files from a list of paths.
///
/// Paths can be files (used directly) or directories (searched recursively
/// for files with one of `extensions`).
pub fn discover_diagram_files(
    paths: &[PathBuf],
    extensions: &[String],
) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let display = path.display().to_string();
            let root = glob::Pattern::escape(display.trim_end_matches('/'));
            for ext in extensions {
                let pattern = format!("{root}/**/*.{ext}");
                let entries = glob::glob(&pattern).map_err(|e| CliError::Other(e.to_string()))?;
                for entry in entries {
                    let entry = entry.map_err(|e| CliError::Other(e.to_string()))?;
                    files.push(entry);
                }
            }
        } else {
            return Err(CliError::NoDiagramFiles { path: path.clone() });
        }
    }

    if files.is_empty() {
        let display_path = paths
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("diagrams/"));
        return Err(CliError::NoDiagramFiles { path: display_path });
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered diagram files");
    Ok(files)
}

/// Reads a whole file, mapping failures to [`CliError::Io`].
pub fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The relationship binding strategy selected by `--resolver`.
pub fn resolver_for(name: &str) -> Box<dyn FkResolver + Send + Sync> {
    match name {
        "label" => Box::new(LabelResolver),
        _ => Box::new(HeuristicResolver),
    }
}

/// Prints parse warnings for one file to stderr.
pub fn report_warnings(
    output: &OutputContext,
    warnings: &[ParseWarning],
    source: &str,
    filename: &str,
) {
    if output.quiet {
        return;
    }
    match output.mode {
        OutputMode::Human => {
            for report in diagnostic::render_warnings(warnings, source, filename) {
                eprintln!("{report:?}");
            }
        }
        OutputMode::Json => {
            for warning in diagnostic::warnings_to_json(warnings) {
                let json = serde_json::json!({ "file": filename, "warning": warning });
                eprintln!("{json}");
            }
        }
        OutputMode::Plain => {
            for warning in warnings {
                eprintln!("{filename}\twarning\t{}\t{}", warning.line, warning.kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions() -> Vec<String> {
        vec!["mmd".to_string(), "erd".to_string()]
    }

    #[test]
    fn discover_nonexistent_path() {
        let result = discover_diagram_files(&[PathBuf::from("/nonexistent/path")], &extensions());
        assert!(matches!(result, Err(CliError::NoDiagramFiles { .. })));
    }

    #[test]
    fn discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_diagram_files(&[dir.path().to_path_buf()], &extensions());
        assert!(result.is_err());
    }

    #[test]
    fn discover_finds_configured_extensions_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let a = dir.path().join("a.mmd");
        let b = dir.path().join("nested/b.erd");
        std::fs::write(&a, "erDiagram\nA").unwrap();
        std::fs::write(&b, "erDiagram\nB").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = discover_diagram_files(&[dir.path().to_path_buf()], &extensions()).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn discover_accepts_direct_file_with_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        std::fs::write(&path, "erDiagram\nA").unwrap();
        let files = discover_diagram_files(std::slice::from_ref(&path), &extensions()).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn discover_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mmd");
        std::fs::write(&path, "erDiagram\nA").unwrap();
        let files = discover_diagram_files(&[path.clone(), path], &extensions()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn read_source_missing_file() {
        let result = read_source(Path::new("/nonexistent/a.mmd"));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }

    #[test]
    fn resolver_selection() {
        let source = "erDiagram\nU {\n int id PK\n}\nP {\n int user_id FK\n}\nP }o--|| U : writes\n";
        let bound = |name: &str| {
            let diagram = erdsync_dsl::parse_with(source, resolver_for(name).as_ref()).unwrap();
            diagram.entities[1].fields[0]
                .fk_reference
                .as_ref()
                .is_some_and(|r| r.is_resolved())
        };
        assert!(bound("heuristic"));
        assert!(!bound("label"));
    }
}
