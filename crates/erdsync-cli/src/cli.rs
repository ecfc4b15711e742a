use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Two-way editor for Mermaid-style ER diagrams.
///
/// erdsync parses `erDiagram` text into an entity model, renders models back
/// to canonical diagram text, and can keep a diagram file and a JSON model in
/// step while you edit.
#[derive(Parser)]
#[command(
    name = "erdsync",
    version,
    about = "Two-way editor for Mermaid-style ER diagrams",
    after_help = "Use 'erdsync <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: ERDSYNC_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "ERDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate diagram files
    Parse(ParseArgs),

    /// Rewrite diagram files in canonical form
    Fmt(FmtArgs),

    /// Render a JSON entity model as diagram text
    Generate(GenerateArgs),

    /// Export parsed diagrams in other formats
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Watch a diagram file and keep a JSON model in sync with it
    Watch(WatchArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments for `erdsync parse`.
#[derive(Args)]
pub struct ParseArgs {
    /// Diagram files or directories (default: `default_diagram_dir` from config)
    pub paths: Vec<PathBuf>,

    /// Print the regenerated canonical text of each file
    #[arg(long = "print")]
    pub print: bool,

    /// How relationship lines are bound to FK fields: heuristic, label
    #[arg(long = "resolver", default_value = "heuristic", value_parser = ["heuristic", "label"])]
    pub resolver: String,
}

/// Arguments for `erdsync fmt`.
#[derive(Args)]
pub struct FmtArgs {
    /// Diagram files or directories (default: `default_diagram_dir` from config)
    pub paths: Vec<PathBuf>,

    /// Report files that are not canonical instead of rewriting them
    #[arg(long = "check")]
    pub check: bool,
}

/// Arguments for `erdsync generate`.
#[derive(Args)]
pub struct GenerateArgs {
    /// JSON file holding an array of entities
    pub model: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Export subcommands.
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the parsed entity model as JSON
    Json(ExportJsonArgs),
}

/// Arguments for `erdsync export json`.
#[derive(Args)]
pub struct ExportJsonArgs {
    /// Diagram file to export
    pub path: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// How relationship lines are bound to FK fields: heuristic, label
    #[arg(long = "resolver", default_value = "heuristic", value_parser = ["heuristic", "label"])]
    pub resolver: String,
}

/// Arguments for `erdsync watch`.
#[derive(Args)]
pub struct WatchArgs {
    /// Diagram file to watch
    pub path: PathBuf,

    /// Write the model as JSON to this file after every successful parse
    #[arg(short = 'm', long = "model")]
    pub model: Option<PathBuf>,

    /// Quiet period after an edit before it is parsed (overrides config)
    #[arg(long = "debounce-ms")]
    pub debounce_ms: Option<u64>,

    /// How often the file is checked for changes (overrides config)
    #[arg(long = "poll-ms")]
    pub poll_ms: Option<u64>,
}

/// Arguments for `erdsync completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_parser = ["bash", "zsh", "fish", "powershell", "elvish"])]
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_minimal_args() {
        let cli = Cli::try_parse_from(["erdsync", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }

    #[test]
    fn parse_global_verbose() {
        let cli = Cli::try_parse_from(["erdsync", "-vvv", "completions", "bash"]).unwrap();
        assert_eq!(cli.global.verbose, 3);
    }

    #[test]
    fn parse_global_format_json() {
        let cli = Cli::try_parse_from(["erdsync", "--format", "json", "completions", "bash"])
            .unwrap();
        assert_eq!(cli.global.format, "json");
    }

    #[test]
    fn parse_parse_command_with_print() {
        let cli = Cli::try_parse_from(["erdsync", "parse", "--print", "diagrams/"]).unwrap();
        if let Commands::Parse(args) = cli.command {
            assert!(args.print);
            assert_eq!(args.paths, vec![PathBuf::from("diagrams/")]);
            assert_eq!(args.resolver, "heuristic");
        } else {
            panic!("expected Parse command");
        }
    }

    #[test]
    fn parse_paths_default_to_empty() {
        let cli = Cli::try_parse_from(["erdsync", "parse"]).unwrap();
        if let Commands::Parse(args) = cli.command {
            assert!(args.paths.is_empty());
        } else {
            panic!("expected Parse command");
        }
    }

    #[test]
    fn parse_fmt_check() {
        let cli = Cli::try_parse_from(["erdsync", "fmt", "--check", "a.mmd", "b.mmd"]).unwrap();
        if let Commands::Fmt(args) = cli.command {
            assert!(args.check);
            assert_eq!(args.paths.len(), 2);
        } else {
            panic!("expected Fmt command");
        }
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::try_parse_from(["erdsync", "generate", "model.json", "-o", "out.mmd"])
            .unwrap();
        if let Commands::Generate(args) = cli.command {
            assert_eq!(args.model, PathBuf::from("model.json"));
            assert_eq!(args.output, Some(PathBuf::from("out.mmd")));
        } else {
            panic!("expected Generate command");
        }
    }

    #[test]
    fn parse_export_json() {
        let cli = Cli::try_parse_from([
            "erdsync",
            "export",
            "json",
            "shop.mmd",
            "--resolver",
            "label",
        ])
        .unwrap();
        if let Commands::Export {
            command: ExportCommands::Json(args),
        } = cli.command
        {
            assert_eq!(args.path, PathBuf::from("shop.mmd"));
            assert_eq!(args.resolver, "label");
            assert!(args.output.is_none());
        } else {
            panic!("expected Export Json command");
        }
    }

    #[test]
    fn parse_watch_command() {
        let cli = Cli::try_parse_from([
            "erdsync",
            "watch",
            "shop.mmd",
            "--model",
            "shop.json",
            "--debounce-ms",
            "50",
        ])
        .unwrap();
        if let Commands::Watch(args) = cli.command {
            assert_eq!(args.model, Some(PathBuf::from("shop.json")));
            assert_eq!(args.debounce_ms, Some(50));
            assert_eq!(args.poll_ms, None);
        } else {
            panic!("expected Watch command");
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["erdsync", "-v", "-q", "completions", "bash"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_format_rejected() {
        let result = Cli::try_parse_from(["erdsync", "--format", "xml", "completions", "bash"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_resolver_rejected() {
        let result = Cli::try_parse_from(["erdsync", "parse", "--resolver", "magic"]);
        assert!(result.is_err());
    }
}
