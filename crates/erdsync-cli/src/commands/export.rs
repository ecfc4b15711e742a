use erdsync_dsl::parse_with;

use super::{read_source, report_warnings, resolver_for};
use crate::cli::{ExportCommands, ExportJsonArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `export` command.
pub async fn run(
    command: ExportCommands,
    _global: &GlobalOpts,
    output: &OutputContext,
) -> Result<(), CliError> {
    match command {
        ExportCommands::Json(args) => run_json(args, output),
    }
}

fn run_json(args: ExportJsonArgs, output: &OutputContext) -> Result<(), CliError> {
    let source_text = read_source(&args.path)?;
    let filename = args.path.display().to_string();
    let resolver = resolver_for(&args.resolver);

    let diagram = match parse_with(&source_text, resolver.as_ref()) {
        Ok(diagram) => diagram,
        Err(error) => {
            return Err(CliError::Parse {
                error,
                source_text,
                file: args.path,
            })
        }
    };
    report_warnings(output, &diagram.warnings, &source_text, &filename);

    let json = serde_json::to_string_pretty(&diagram.entities)
        .map_err(|e| CliError::Other(format!("failed to serialize model: {e}")))?;
    output.emit(&json, args.output.as_deref())
}
