use erdsync_core::project::Project;
use erdsync_core::types::Entity;

use super::read_source;
use crate::cli::{GenerateArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `generate` command: render a JSON model as diagram text.
///
/// The model goes through [`Project::set_entities`] first, so field
/// invariants hold and dangling FK targets are dropped before rendering.
/// A model with clashing entity or field names is rejected.
pub async fn run(
    args: GenerateArgs,
    _global: &GlobalOpts,
    output: &OutputContext,
) -> Result<(), CliError> {
    let text = read_source(&args.model)?;
    let entities: Vec<Entity> = serde_json::from_str(&text).map_err(|e| CliError::Json {
        path: args.model.clone(),
        source: e,
    })?;

    let name = args
        .model
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut project = Project::new(name);
    project
        .set_entities(entities)
        .map_err(|source| CliError::Model {
            path: args.model.clone(),
            source,
        })?;
    tracing::debug!(entities = project.entities().len(), "loaded model");

    let diagram = erdsync_dsl::generate(project.entities());
    output.emit(&diagram, args.output.as_deref())
}
