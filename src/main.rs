use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use breathwork::cli::args::{Cli, Commands, RunArgs};
use breathwork::cli::commands;
use breathwork::config::{Config, Paths};
use breathwork::logging::{self, LogTarget};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;
    let mut paths = Paths::default();
    if let Some(config_file) = cli.config {
        paths = paths.with_config_file(config_file);
    }

    let output = match cli.command {
        None => run_session(&paths, &RunArgs::default(), cli.verbose, format)?,
        Some(Commands::Run(args)) => run_session(&paths, &args, cli.verbose, format)?,
        Some(Commands::Plan(args)) => {
            logging::init(cli.verbose, &LogTarget::Stderr);
            let config = Config::load_from_path(&paths.config_file)?;
            commands::plan(&config, &args, format)?
        }
        Some(Commands::Config(args)) => {
            logging::init(cli.verbose, &LogTarget::Stderr);
            commands::config(&paths, &args.command, format)?
        }
        Some(Commands::Completions { shell }) => commands::completions(shell)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn run_session(
    paths: &Paths,
    args: &RunArgs,
    verbose: u8,
    format: breathwork::OutputFormat,
) -> Result<String> {
    let config = Config::load_from_path(&paths.config_file)?;
    // The terminal UI owns the screen, so its logs go to a file
    let target = if args.headless {
        LogTarget::Stderr
    } else if config.log.file {
        LogTarget::File(paths.log_file.clone())
    } else {
        LogTarget::Off
    };
    logging::init(verbose, &target);
    Ok(commands::run(&config, args, format)?)
}
