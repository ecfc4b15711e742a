use std::path::PathBuf;

use erdsync_dsl::{generate, parse};

use super::{discover_diagram_files, read_source, report_warnings};
use crate::cli::{FmtArgs, GlobalOpts};
use crate::config::load_config;
use crate::diagnostic::parse_error_report;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};
use crate::progress;

/// Run the `fmt` command: rewrite diagram files in canonical form.
///
/// Files that parse with warnings are left untouched: their canonical form
/// would lose the skipped lines.
pub async fn run(
    args: FmtArgs,
    global: &GlobalOpts,
    output: &OutputContext,
) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let paths = config.cli.paths_or_default(&args.paths);
    let files = discover_diagram_files(&paths, &config.cli.extensions)?;

    let bar = (output.show_progress() && files.len() > 1)
        .then(|| progress::create_file_bar(files.len()));

    let mut unchanged = 0usize;
    let mut rewritten: Vec<PathBuf> = Vec::new();
    let mut differing: Vec<PathBuf> = Vec::new();
    let mut skipped: Vec<PathBuf> = Vec::new();
    let mut failed = 0usize;

    for file in &files {
        if let Some(bar) = &bar {
            bar.set_message(file.display().to_string());
        }
        let source_text = read_source(file)?;
        let filename = file.display().to_string();

        match parse(&source_text) {
            Ok(diagram) => {
                let canonical = format!("{}\n", generate(&diagram.entities));
                if canonical == source_text {
                    unchanged += 1;
                } else if args.check {
                    differing.push(file.clone());
                } else if !diagram.warnings.is_empty() {
                    let notify = || {
                        report_warnings(output, &diagram.warnings, &source_text, &filename);
                        output.warn(&format!(
                            "{filename} left unchanged: {} warnings",
                            diagram.warnings.len()
                        ));
                    };
                    match &bar {
                        Some(bar) => bar.suspend(notify),
                        None => notify(),
                    }
                    skipped.push(file.clone());
                } else {
                    std::fs::write(file, &canonical).map_err(|e| CliError::Io {
                        path: file.clone(),
                        source: e,
                    })?;
                    tracing::debug!(file = %filename, "rewrote diagram");
                    rewritten.push(file.clone());
                }
            }
            Err(error) => {
                failed += 1;
                let notify = || match output.mode {
                    OutputMode::Human => {
                        eprintln!("{:?}", parse_error_report(&error, &source_text, &filename));
                    }
                    OutputMode::Json => {
                        let json = serde_json::json!({
                            "file": filename,
                            "error": error.kind().as_str(),
                            "message": error.description(),
                        });
                        eprintln!("{json}");
                    }
                    OutputMode::Plain => eprintln!("{filename}\terror\t{error}"),
                };
                match &bar {
                    Some(bar) => bar.suspend(notify),
                    None => notify(),
                }
            }
        }

        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let as_strings =
        |files: &[PathBuf]| files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>();

    match output.mode {
        OutputMode::Human => {
            for file in &differing {
                output.warn(&format!("{} is not canonically formatted", file.display()));
            }
            output.status(&format!(
                "{} files: {} rewritten, {unchanged} unchanged, {} skipped, {failed} failed",
                files.len(),
                rewritten.len(),
                skipped.len()
            ));
        }
        OutputMode::Json => {
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "rewritten": as_strings(&rewritten),
                "not_canonical": as_strings(&differing),
                "skipped": as_strings(&skipped),
                "unchanged": unchanged,
                "failed": failed,
            }));
        }
        OutputMode::Plain => {
            for file in &differing {
                println!("{}", file.display());
            }
        }
    }

    if failed > 0 {
        return Err(CliError::ParseFailures {
            failed,
            total: files.len(),
        });
    }
    if !differing.is_empty() {
        return Err(CliError::NotCanonical { files: differing });
    }
    if rewritten.is_empty() && skipped.is_empty() {
        output.success("All files already canonical");
    }
    Ok(())
}
