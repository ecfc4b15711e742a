use erdsync_dsl::{generate, parse_with};

use super::{discover_diagram_files, read_source, report_warnings, resolver_for};
use crate::cli::{GlobalOpts, ParseArgs};
use crate::config::load_config;
use crate::diagnostic::{parse_error_report, warnings_to_json};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `parse` command: validate diagram files and render diagnostics.
pub async fn run(
    args: ParseArgs,
    global: &GlobalOpts,
    output: &OutputContext,
) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let paths = config.cli.paths_or_default(&args.paths);
    let files = discover_diagram_files(&paths, &config.cli.extensions)?;
    let resolver = resolver_for(&args.resolver);

    let mut total_entities = 0usize;
    let mut total_warnings = 0usize;
    let mut failed = 0usize;
    let mut all_file_results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();

        match parse_with(&source_text, resolver.as_ref()) {
            Ok(diagram) => {
                let count = diagram.entities.len();
                let warning_count = diagram.warnings.len();
                total_entities += count;
                total_warnings += warning_count;

                if args.print {
                    println!("{}", generate(&diagram.entities));
                }

                if output.mode == OutputMode::Json {
                    all_file_results.push(serde_json::json!({
                        "file": filename,
                        "entities": count,
                        "warnings": warnings_to_json(&diagram.warnings),
                        "error": null,
                    }));
                } else {
                    report_warnings(output, &diagram.warnings, &source_text, &filename);
                    output.status(&format!(
                        "  {filename} .... {count} entities, {warning_count} warnings"
                    ));
                }
            }
            Err(error) => {
                failed += 1;
                match output.mode {
                    OutputMode::Human => {
                        eprintln!("{:?}", parse_error_report(&error, &source_text, &filename));
                    }
                    OutputMode::Json => {
                        all_file_results.push(serde_json::json!({
                            "file": filename,
                            "entities": 0,
                            "warnings": [],
                            "error": {
                                "kind": error.kind().as_str(),
                                "title": error.title(),
                                "message": error.description(),
                            },
                        }));
                    }
                    OutputMode::Plain => {
                        eprintln!("{filename}\terror\t{error}");
                    }
                }
            }
        }
    }

    // Summary
    match output.mode {
        OutputMode::Human => {
            let summary = format!(
                "{total_entities} entities parsed from {} files, {total_warnings} warnings, {failed} failed",
                files.len()
            );
            if failed > 0 {
                output.warn(&summary);
            } else {
                output.success(&summary);
            }
        }
        OutputMode::Json => {
            let summary = serde_json::json!({
                "files": files.len(),
                "entities": total_entities,
                "warnings": total_warnings,
                "failed": failed,
                "results": all_file_results,
            });
            output.print_json(&summary);
        }
        OutputMode::Plain => {
            println!("{}\t{total_entities}\t{total_warnings}\t{failed}", files.len());
        }
    }

    if failed > 0 {
        Err(CliError::ParseFailures {
            failed,
            total: files.len(),
        })
    } else {
        Ok(())
    }
}
