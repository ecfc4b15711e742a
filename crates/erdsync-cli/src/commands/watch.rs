use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use erdsync_core::project::Project;
use erdsync_core::types::Entity;
use erdsync_dsl::{SyncController, SyncOutcome};
use tokio::time::MissedTickBehavior;

use super::{read_source, report_warnings};
use crate::cli::{GlobalOpts, WatchArgs};
use crate::config::load_config;
use crate::diagnostic::parse_error_report;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};
use crate::progress;

/// Something a [`WatchSession::tick`] did.
#[derive(Debug)]
pub enum WatchEvent {
    /// The diagram file was checked; carries what the sync controller did.
    Diagram(SyncOutcome),
    /// The model file changed on disk and the diagram was rewritten from it.
    Regenerated { entities: usize },
}

/// A diagram file, an optional JSON model file, and the project between them.
///
/// The diagram is authoritative at start-up: a model file that already
/// exists is only read once it changes.
pub struct WatchSession {
    path: PathBuf,
    model_path: Option<PathBuf>,
    project: Project,
    sync: SyncController,
    last_text: Option<String>,
    last_model: Option<String>,
}

impl WatchSession {
    pub fn open(path: &Path, model_path: Option<PathBuf>, debounce: Duration) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let project = Project::new(name);
        let sync = SyncController::new(&project, debounce);
        let last_model = model_path
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok());

        Self {
            path: path.to_path_buf(),
            model_path,
            project,
            sync,
            last_text: None,
            last_model,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Checks both files once.
    ///
    /// An external change to the model file wins over a diagram edit that is
    /// still waiting out its debounce.
    pub fn tick(&mut self, now: Instant) -> Result<WatchEvent, CliError> {
        if let Some(entities) = self.model_changed()? {
            return Ok(WatchEvent::Regenerated { entities });
        }

        let current = read_source(&self.path)?;
        if self.last_text.as_deref() != Some(current.as_str()) {
            tracing::debug!(bytes = current.len(), "diagram file changed");
            self.sync.on_text_edit(current.clone(), now);
            self.last_text = Some(current);
        }

        let outcome = self.sync.poll(&mut self.project, now);
        if matches!(outcome, SyncOutcome::Applied { .. }) {
            self.write_model()?;
        }
        Ok(WatchEvent::Diagram(outcome))
    }

    fn model_changed(&mut self) -> Result<Option<usize>, CliError> {
        let Some(model_path) = self.model_path.clone() else {
            return Ok(None);
        };
        let Ok(current) = std::fs::read_to_string(&model_path) else {
            return Ok(None);
        };
        if self.last_model.as_deref() == Some(current.as_str()) {
            return Ok(None);
        }
        self.last_model = Some(current.clone());

        let entities: Vec<Entity> =
            serde_json::from_str(&current).map_err(|e| CliError::Json {
                path: model_path.clone(),
                source: e,
            })?;
        self.project
            .set_entities(entities)
            .map_err(|source| CliError::Model {
                path: model_path,
                source,
            })?;

        let Some(text) = self.sync.on_model_changed(&self.project) else {
            return Ok(None);
        };
        let contents = format!("{text}\n");
        std::fs::write(&self.path, &contents).map_err(|e| CliError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        self.last_text = Some(contents);
        tracing::debug!("diagram regenerated from model file");
        Ok(Some(self.project.entities().len()))
    }

    fn write_model(&mut self) -> Result<(), CliError> {
        let Some(model_path) = &self.model_path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self.project.entities())
            .map_err(|e| CliError::Other(format!("failed to serialize model: {e}")))?;
        let contents = format!("{json}\n");
        std::fs::write(model_path, &contents).map_err(|e| CliError::Io {
            path: model_path.clone(),
            source: e,
        })?;
        self.last_model = Some(contents);
        Ok(())
    }
}

/// Run the `watch` command until interrupted.
pub async fn run(
    args: WatchArgs,
    global: &GlobalOpts,
    output: &OutputContext,
) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let debounce = args
        .debounce_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.sync.debounce());
    let poll = args
        .poll_ms
        .map(|ms| Duration::from_millis(ms.max(1)))
        .unwrap_or_else(|| config.sync.poll_interval());

    if !args.path.is_file() {
        return Err(CliError::NoDiagramFiles { path: args.path });
    }

    let filename = args.path.display().to_string();
    let mut session = WatchSession::open(&args.path, args.model, debounce);
    tracing::info!(file = %filename, ?debounce, ?poll, "watching");

    let spinner = output
        .show_progress()
        .then(|| progress::create_spinner(&format!("Watching {filename}")));

    let mut interval = tokio::time::interval(poll);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let result = session.tick(Instant::now());
                let notify = || report(&result, output, &filename, &session);
                match &spinner {
                    Some(spinner) => spinner.suspend(notify),
                    None => notify(),
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("interrupt received, stopping watch");
                break;
            }
        }
    }

    if let Some(spinner) = &spinner {
        progress::finish_spinner(
            spinner,
            &format!("{} entities in {filename}", session.project().entities().len()),
        );
    }
    Ok(())
}

fn report(
    result: &Result<WatchEvent, CliError>,
    output: &OutputContext,
    filename: &str,
    session: &WatchSession,
) {
    match result {
        Ok(WatchEvent::Diagram(SyncOutcome::Applied { entities, warnings })) => {
            let source = session.last_text.as_deref().unwrap_or_default();
            report_warnings(output, warnings, source, filename);
            match output.mode {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "event": "applied",
                        "entities": entities,
                        "warnings": warnings.len(),
                    });
                    println!("{json}");
                }
                OutputMode::Plain => println!("applied\t{entities}\t{}", warnings.len()),
                OutputMode::Human => output.success(&format!(
                    "{filename}: {entities} entities, {} warnings",
                    warnings.len()
                )),
            }
        }
        Ok(WatchEvent::Diagram(SyncOutcome::Failed(error))) => match output.mode {
            OutputMode::Human => {
                let source = session.last_text.as_deref().unwrap_or_default();
                eprintln!("{:?}", parse_error_report(error, source, filename));
            }
            OutputMode::Json => {
                let json = serde_json::json!({
                    "event": "failed",
                    "kind": error.kind().as_str(),
                    "message": error.description(),
                });
                println!("{json}");
            }
            OutputMode::Plain => println!("failed\t{error}"),
        },
        Ok(WatchEvent::Regenerated { entities }) => match output.mode {
            OutputMode::Json => {
                println!("{}", serde_json::json!({ "event": "regenerated", "entities": entities }));
            }
            OutputMode::Plain => println!("regenerated\t{entities}"),
            OutputMode::Human => {
                output.success(&format!("{filename}: regenerated from model ({entities} entities)"));
            }
        },
        Ok(WatchEvent::Diagram(_)) => {}
        Err(err) => output.warn(&err.to_string()),
    }
}
