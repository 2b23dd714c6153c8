mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod provider;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::apply::ApplyOptions;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Config file override
    pub config: Option<String>,
    /// State file override
    pub state: Option<String>,
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
        config: cli.config,
        state: cli.state,
    };

    match cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, args.target.as_deref(), args.jobs),
        Command::Apply(args) => commands::apply::run(
            &ctx,
            &ApplyOptions {
                target: args.target.as_deref(),
                dry_run: args.dry_run,
                jobs: args.jobs,
                yes: args.yes,
            },
        ),
        Command::Refresh { jobs } => commands::refresh::run(&ctx, jobs),
        Command::Import {
            type_name,
            label,
            id,
        } => commands::import::run(&ctx, &type_name, &label, &id),
        Command::Destroy { target, yes, jobs } => {
            commands::destroy::run(&ctx, target.as_deref(), yes, jobs)
        }
        Command::Schema { type_name } => commands::schema::run(type_name.as_deref()),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bigip-provider", &mut io::stdout());
            Ok(())
        }
    }
}
