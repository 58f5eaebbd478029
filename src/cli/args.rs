use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::breath::{BackendKind, BreathPattern};
use crate::config::MAX_CYCLES;

#[derive(Parser, Debug)]
#[command(name = "breathwork")]
#[command(about = "A guided-breathing timer for the terminal")]
#[command(long_about = "breathwork - A guided-breathing timer for the terminal

Walks you through Inhale, Hold and Exhale phases with a filling ring,
a breathing orb, a countdown and short tones, for as many cycles as
you like. The default pattern is 4-7-8 breathing.

QUICK START:
  breathwork                     Open the breathing ring
  breathwork run --cycles 6      Six cycles instead of the configured count
  breathwork run -p 4-4-6        Custom phase lengths in seconds
  breathwork run --headless      Run without the full-screen interface
  breathwork plan                Show phases and total session length

KEYS:
  Space / Enter    Start, pause, resume
  Shift+S          Sound on/off
  + / -            More or fewer cycles (resets the session)
  q / Esc          Quit

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Configuration file to use instead of ~/.breathwork/config.yaml
    #[arg(short, long, global = true, env = "BREATHWORK_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); BREATHWORK_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Command to run; opens the breathing ring when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a breathing session
    ///
    /// Opens the full-screen breathing ring. Click the ring or press Space
    /// to start, pause and resume. With --headless the session starts at
    /// once and prints each phase as a line instead, then a summary.
    ///
    /// # Examples
    ///
    ///   breathwork run                     Configured pattern and cycles
    ///   breathwork run -n 2 -p 4-7-8       Two cycles of 4-7-8
    ///   breathwork run --headless --mute   Quiet line-by-line session
    #[command(alias = "r")]
    Run(RunArgs),

    /// Show the phase plan and total session length
    ///
    /// # Examples
    ///
    ///   breathwork plan                 Configured plan
    ///   breathwork plan -p 5-5-5 -n 10  Plan for custom settings
    ///   breathwork plan -o json         Machine-readable
    Plan(SessionArgs),

    /// Show, locate or create the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// # Examples
    ///
    ///   breathwork completions bash > ~/.local/share/bash-completion/completions/breathwork
    ///   breathwork completions zsh > ~/.zfunc/_breathwork
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Overrides for the session shape.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionArgs {
    /// Number of cycles (1 to 99)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CYCLES)))]
    pub cycles: Option<u32>,

    /// Phase lengths in seconds as inhale-hold-exhale, e.g. 4-7-8
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<BreathPattern>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Run without the full-screen interface, printing one line per phase
    #[arg(long)]
    pub headless: bool,

    /// Start with sound off
    #[arg(short, long)]
    pub mute: bool,

    /// Audio backend
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_opens_ring() {
        let cli = Cli::try_parse_from(["breathwork"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.output, OutputFormat::Pretty);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "breathwork",
            "run",
            "--headless",
            "-n",
            "3",
            "-p",
            "4-4-6",
            "--mute",
            "--backend",
            "bell",
            "-vv",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.headless);
        assert!(args.mute);
        assert_eq!(args.backend, Some(BackendKind::Bell));
        assert_eq!(args.session.cycles, Some(3));
        let pattern = args.session.pattern.unwrap();
        assert_eq!(pattern.exhale, Duration::from_secs(6));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cycle_bounds() {
        assert!(Cli::try_parse_from(["breathwork", "run", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["breathwork", "run", "-n", "100"]).is_err());
        assert!(Cli::try_parse_from(["breathwork", "plan", "-n", "99"]).is_ok());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        assert!(Cli::try_parse_from(["breathwork", "plan", "-p", "4-7"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "breathwork",
            "plan",
            "-o",
            "json",
            "--config",
            "/tmp/bw.yaml",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/bw.yaml")));
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::try_parse_from(["breathwork", "config", "init", "--force"]).unwrap();
        let Some(Commands::Config(args)) = cli.command else {
            panic!("expected config");
        };
        assert_eq!(args.command, ConfigCommands::Init { force: true });
    }

    #[test]
    fn test_completions_shell() {
        let cli = Cli::try_parse_from(["breathwork", "completions", "fish"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Completions { shell: Shell::Fish })
        ));
    }
}
