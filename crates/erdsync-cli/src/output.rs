use std::path::Path;

use console::{Style, Term};

use crate::cli::GlobalOpts;
use crate::diagnostic;
use crate::error::CliError;

/// How messages and results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    fn from_flag(format: &str) -> Self {
        match format {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

/// Rendering settings shared by every command.
///
/// Messages go to stderr; command results (diagram text, JSON) go to
/// stdout or to an output file.
pub struct OutputContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let dumb_terminal = std::env::var("TERM").is_ok_and(|t| t == "dumb");
        Self {
            mode: OutputMode::from_flag(&global.format),
            quiet: global.quiet,
            use_color: !global.no_color && !dumb_terminal && Term::stderr().is_term(),
        }
    }

    fn human_chatter(&self) -> bool {
        !self.quiet && self.mode == OutputMode::Human
    }

    /// `text` styled when color is on, as-is otherwise.
    fn label(&self, text: &str, style: Style) -> String {
        if self.use_color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, msg: &str) {
        if self.human_chatter() {
            eprintln!("{} {msg}", self.label("ok", Style::new().green().bold()));
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                eprintln!("{} {msg}", self.label("warning:", Style::new().yellow().bold()));
            }
            OutputMode::Json => eprintln!("{}", serde_json::json!({ "warning": msg })),
            OutputMode::Plain => eprintln!("warning\t{msg}"),
        }
    }

    /// Reports a failed command. Human mode renders parse errors against
    /// their source text.
    pub fn print_error(&self, err: &CliError) {
        match (self.mode, err) {
            (
                OutputMode::Human,
                CliError::Parse {
                    error,
                    source_text,
                    file,
                },
            ) => {
                let name = file.display().to_string();
                eprintln!("{:?}", diagnostic::parse_error_report(error, source_text, &name));
            }
            (OutputMode::Human, _) => {
                eprintln!("{} {err}", self.label("error:", Style::new().red().bold()));
            }
            (OutputMode::Json, _) => eprintln!("{}", err.to_json()),
            (OutputMode::Plain, _) => eprintln!("error\t{err}"),
        }
    }

    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(text) = serde_json::to_string_pretty(value) {
            println!("{text}");
        }
    }

    /// Progress chatter for humans; silent under `--quiet` or machine formats.
    pub fn status(&self, msg: &str) {
        if self.human_chatter() {
            eprintln!("{msg}");
        }
    }

    pub fn show_progress(&self) -> bool {
        self.human_chatter() && Term::stderr().is_term()
    }

    /// Writes a command result to `path`, or to stdout when there is none.
    /// File output always ends with a newline.
    pub fn emit(&self, text: &str, path: Option<&Path>) -> Result<(), CliError> {
        let Some(path) = path else {
            println!("{text}");
            return Ok(());
        };
        let contents = if text.ends_with('\n') {
            text.to_string()
        } else {
            format!("{text}\n")
        };
        std::fs::write(path, contents).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.success(&format!("Wrote {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(mode: OutputMode, quiet: bool) -> OutputContext {
        OutputContext {
            mode,
            quiet,
            use_color: false,
        }
    }

    fn global(format: &str, no_color: bool) -> GlobalOpts {
        GlobalOpts {
            config: None,
            format: format.into(),
            verbose: 0,
            quiet: false,
            no_color,
        }
    }

    #[test]
    fn format_flag_selects_mode() {
        for (flag, mode) in [
            ("human", OutputMode::Human),
            ("json", OutputMode::Json),
            ("plain", OutputMode::Plain),
            ("anything", OutputMode::Human),
        ] {
            assert_eq!(OutputContext::from_global(&global(flag, false)).mode, mode);
        }
    }

    #[test]
    fn no_color_flag_wins() {
        assert!(!OutputContext::from_global(&global("human", true)).use_color);
    }

    #[test]
    fn labels_are_plain_without_color() {
        let out = ctx(OutputMode::Human, false);
        assert_eq!(out.label("ok", Style::new().green()), "ok");
    }

    #[test]
    fn chatter_only_for_unquiet_humans() {
        assert!(ctx(OutputMode::Human, false).human_chatter());
        assert!(!ctx(OutputMode::Human, true).human_chatter());
        assert!(!ctx(OutputMode::Json, false).show_progress());
        assert!(!ctx(OutputMode::Plain, false).show_progress());
    }

    #[test]
    fn emit_to_file_appends_newline_once() {
        let dir = tempfile::tempdir().unwrap();
        let out = ctx(OutputMode::Plain, true);
        for text in ["erDiagram", "erDiagram\n"] {
            let path = dir.path().join("out.mmd");
            out.emit(text, Some(&path)).unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "erDiagram\n");
        }
    }

    #[test]
    fn emit_to_missing_dir_is_io_error() {
        let result = ctx(OutputMode::Plain, true).emit("x", Some(Path::new("/nonexistent/dir/out.mmd")));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }
}
