mod adapter;
mod api;
mod cli;
mod commands;
mod config;
mod paths;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
}

impl Context {
    /// Load and validate the config file
    pub fn load_config(&self) -> Result<config::NetformConfig> {
        config::NetformConfig::load(&self.config_path)
    }

    /// Load the recorded state
    pub fn load_state(&self) -> Result<state::NetformState> {
        state::NetformState::load(&self.state_path)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: paths::resolve(cli.config.as_deref(), paths::config_file)?,
        state_path: paths::resolve(cli.state.as_deref(), paths::state_file)?,
    };

    match cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, &args),
        Command::Refresh(args) => commands::refresh::run(&ctx, &args),
        Command::Show(args) => commands::show::run(&ctx, args.connector.as_deref()),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "netform", &mut io::stdout());
            Ok(())
        }
    }
}
