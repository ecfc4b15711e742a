//! Keeping diagram text and a [`Project`] in step.
//!
//! Text edits are debounced and parsed into the project; model edits made
//! elsewhere regenerate the text. The controller never reads a clock: every
//! call that cares about time takes `now`, so it can sit behind a UI event
//! loop, a file watcher, or a test.

use std::time::{Duration, Instant};

use erdsync_core::project::Project;
use erdsync_core::reconcile;

use crate::error::{ParseError, ParseWarning};
use crate::generator::generate;
use crate::parser::parse_with;
use crate::resolver::{FkResolver, HeuristicResolver};

/// Debounce used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// What a call to [`SyncController::poll`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No edit is waiting.
    Idle,
    /// An edit is waiting for its debounce to expire.
    Pending { due: Instant },
    /// The text parsed and replaced the project's entities.
    Applied {
        entities: usize,
        warnings: Vec<ParseWarning>,
    },
    /// The text was rejected; the project is unchanged.
    Failed(ParseError),
}

#[derive(Debug, Clone, Copy)]
struct PendingEdit {
    due: Instant,
    generation: u64,
}

pub struct SyncController {
    text: String,
    debounce: Duration,
    resolver: Box<dyn FkResolver + Send + Sync>,
    pending: Option<PendingEdit>,
    generation: u64,
    /// Last project revision this controller either produced or rendered.
    synced_revision: u64,
    last_error: Option<ParseError>,
}

impl SyncController {
    /// Starts in sync with `project`, rendering its current entities.
    pub fn new(project: &Project, debounce: Duration) -> Self {
        Self {
            text: generate(project.entities()),
            debounce,
            resolver: Box::new(HeuristicResolver),
            pending: None,
            generation: 0,
            synced_revision: project.revision(),
            last_error: None,
        }
    }

    /// Replaces the strategy used to bind relationship lines.
    pub fn with_resolver(mut self, resolver: impl FkResolver + Send + Sync + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// The current diagram text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The error from the most recent failed parse, cleared by the next
    /// successful parse or model-driven regeneration.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }

    /// Number of text edits received so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the waiting edit becomes due, if there is one.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Records a text edit. Any waiting edit is superseded and the debounce
    /// restarts from `now`.
    pub fn on_text_edit(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.generation += 1;
        let due = now + self.debounce;
        if let Some(previous) = self.pending.replace(PendingEdit {
            due,
            generation: self.generation,
        }) {
            tracing::trace!(superseded = previous.generation, "restarting debounce");
        }
    }

    /// Parses the waiting edit once its debounce has expired.
    ///
    /// On success the parsed entities are reconciled against the live ones
    /// (so unchanged entities and fields keep their ids) and installed. The
    /// text is left exactly as typed.
    pub fn poll(&mut self, project: &mut Project, now: Instant) -> SyncOutcome {
        let Some(pending) = self.pending else {
            return SyncOutcome::Idle;
        };
        if now < pending.due {
            return SyncOutcome::Pending { due: pending.due };
        }
        self.pending = None;

        let parsed = parse_with(&self.text, self.resolver.as_ref()).and_then(|diagram| {
            let entities = reconcile(project.entities(), diagram.entities);
            let count = entities.len();
            project
                .set_entities(entities)
                .map(|()| (count, diagram.warnings))
                .map_err(|err| ParseError::Internal {
                    message: err.to_string(),
                })
        });

        match parsed {
            Ok((count, warnings)) => {
                self.synced_revision = project.revision();
                self.last_error = None;
                tracing::debug!(
                    generation = pending.generation,
                    entities = count,
                    warnings = warnings.len(),
                    "applied diagram text"
                );
                SyncOutcome::Applied {
                    entities: count,
                    warnings,
                }
            }
            Err(err) => {
                tracing::debug!(generation = pending.generation, error = %err, "diagram text rejected");
                self.last_error = Some(err.clone());
                SyncOutcome::Failed(err)
            }
        }
    }

    /// Regenerates the text after a change made directly to the project.
    ///
    /// Returns the new text, or `None` when the project is at a revision the
    /// controller already knows about (including its own writes). A waiting
    /// text edit is dropped: the model change wins.
    pub fn on_model_changed(&mut self, project: &Project) -> Option<&str> {
        if project.revision() == self.synced_revision {
            return None;
        }
        if self.pending.take().is_some() {
            tracing::debug!("model change discards pending text edit");
        }
        self.text = generate(project.entities());
        self.synced_revision = project.revision();
        self.last_error = None;
        Some(&self.text)
    }
}

impl std::fmt::Debug for SyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("debounce", &self.debounce)
            .field("pending", &self.pending)
            .field("generation", &self.generation)
            .field("synced_revision", &self.synced_revision)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
