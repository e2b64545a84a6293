use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{ColorMode, GlobalFlags, OutputFormat, ProgressMode};
pub use root_commands::Commands;

/// Top-level CLI parser for the `keel` binary.
#[derive(Debug, Parser)]
#[command(name = "keel", version, about = "Keel - internal business dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory holding .keel)
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<String>,

    /// Table colors: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Progress bars: auto, on, off
    #[arg(long, global = true, default_value = "auto")]
    pub progress: ProgressMode,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project_dir: self.project_dir.clone(),
            color: self.color,
            progress: self.progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::subcommands::{AllocationCommands, EsatCommands, QuestionCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "keel",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "dashboard",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Dashboard(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["keel", "dashboard", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["keel", "--format", "xml", "dashboard"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["keel", "-C", "/tmp/acme", "dashboard"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project_dir.as_deref(), Some("/tmp/acme"));
    }

    #[test]
    fn allocation_set_parses() {
        let cli = Cli::try_parse_from([
            "keel",
            "allocation",
            "set",
            "--member",
            "mbr-0001",
            "--month",
            "2026-05",
            "--cost-type",
            "cogs",
            "--percentage",
            "60",
        ])
        .expect("cli should parse");
        let Commands::Allocation { action } = cli.command else {
            panic!("expected allocation command");
        };
        assert!(matches!(
            action,
            AllocationCommands::Set { ref member, percentage, .. }
                if member == "mbr-0001" && (percentage - 60.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn esat_question_and_answers_parse() {
        let cli = Cli::try_parse_from([
            "keel", "esat", "question", "add", "esv-0001", "--category", "growth", "--prompt",
            "I am learning",
        ])
        .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Esat {
                action: EsatCommands::Question {
                    action: QuestionCommands::Add { .. }
                }
            }
        ));

        let cli = Cli::try_parse_from([
            "keel", "esat", "submit", "tok", "--answer", "esq-1=4", "--answer", "esq-2=5",
        ])
        .expect("cli should parse");
        let Commands::Esat {
            action: EsatCommands::Submit { answer, .. },
        } = cli.command
        else {
            panic!("expected esat submit");
        };
        assert_eq!(answer, vec!["esq-1=4", "esq-2=5"]);
    }
}
