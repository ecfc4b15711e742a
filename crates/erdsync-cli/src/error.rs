use std::path::PathBuf;

use erdsync_core::ModelError;
use erdsync_dsl::ParseError;

/// Process exit status, one per class of failure. Success exits with 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
    NotCanonical = 4,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Everything a command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A single diagram was rejected.
    #[error("failed to parse {file}: {error}")]
    Parse {
        #[source]
        error: ParseError,
        source_text: String,
        file: PathBuf,
    },

    /// Several files were processed and some were rejected; each has
    /// already been reported.
    #[error("{failed} of {total} files failed to parse")]
    ParseFailures { failed: usize, total: usize },

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A model file that is not a JSON array of entities.
    #[error("invalid model JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A model file that decodes but breaks a model rule.
    #[error("invalid model in {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("no diagram files found in {path}")]
    NoDiagramFiles { path: PathBuf },

    /// `fmt --check` found differences.
    #[error("{} file(s) are not canonically formatted", files.len())]
    NotCanonical { files: Vec<PathBuf> },

    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Parse { .. } | Self::ParseFailures { .. } => ExitCode::ParseError,
            Self::Config { .. } | Self::NoDiagramFiles { .. } => ExitCode::InvalidArguments,
            Self::NotCanonical { .. } => ExitCode::NotCanonical,
            Self::Io { .. } | Self::Json { .. } | Self::Model { .. } | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Stable machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } | Self::ParseFailures { .. } => "parse_error",
            Self::Io { .. } => "io_error",
            Self::Json { .. } | Self::Model { .. } => "model_error",
            Self::Config { .. } => "config_error",
            Self::NoDiagramFiles { .. } => "no_diagram_files",
            Self::NotCanonical { .. } => "not_canonical",
            Self::Other(_) => "error",
        }
    }

    /// `{ "error": kind, "message": ... }` plus whatever the variant knows
    /// about where it happened.
    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        out.insert("error".into(), self.kind().into());
        out.insert("message".into(), self.to_string().into());

        match self {
            Self::Parse { error, file, .. } => {
                out.insert("file".into(), file.display().to_string().into());
                out.insert("kind".into(), error.kind().as_str().into());
                out.insert("title".into(), error.title().into());
                out.insert("hint".into(), error.description().into());
            }
            Self::ParseFailures { failed, total } => {
                out.insert("failed".into(), (*failed).into());
                out.insert("total".into(), (*total).into());
            }
            Self::Io { path, .. }
            | Self::Json { path, .. }
            | Self::Model { path, .. }
            | Self::NoDiagramFiles { path } => {
                out.insert("path".into(), path.display().to_string().into());
            }
            Self::NotCanonical { files } => {
                let files: Vec<serde_json::Value> = files
                    .iter()
                    .map(|f| f.display().to_string().into())
                    .collect();
                out.insert("files".into(), files.into());
            }
            Self::Config { .. } | Self::Other(_) => {}
        }

        serde_json::Value::Object(out)
    }
}
