use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;
mod persona;

use cli::{Cli, Commands, OutputFormat};
use config::{Config, LogLevel};

fn log_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("personas")
        .join("logs")
        .join("personas.log")
}

/// File logger; RUST_LOG wins over the config level, `-v` raises it to at least debug
fn setup_logging(log_level: &LogLevel, verbose: bool) -> Result<()> {
    let log_file = log_file_path();
    if let Some(dir) = log_file.parent() {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }

    let target = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let from_env = std::env::var("RUST_LOG").is_ok();
    let mut builder = env_logger::Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        let mut filter = log_level.level_filter();
        if verbose {
            filter = filter.max(log::LevelFilter::Debug);
        }
        builder.filter_level(filter);
    }

    builder.target(env_logger::Target::Pipe(Box::new(target))).init();

    info!(
        "Logging to {} at {} (from {})",
        log_file.display(),
        log_level.as_filter(),
        if from_env { "RUST_LOG" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let ctx = commands::Context {
        config: &config,
        dir: cli.dir,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::List { format, tool } => commands::list::run(OutputFormat::resolve(format), tool.as_deref(), &ctx),
        Commands::Show { name, format } => commands::show::run(&name, OutputFormat::resolve(format), &ctx),
        Commands::Prompt { name, with_header } => commands::prompt::run(&name, with_header, &ctx),
        Commands::Validate { paths, strict, format } => {
            commands::validate::run(&paths, strict, OutputFormat::resolve(format), &ctx)
        }
        Commands::Index { output, snippet, format } => {
            commands::index::run(output.as_deref(), snippet, format, &ctx)
        }
        Commands::Tools { format } => commands::tools::run(OutputFormat::resolve(format), &ctx),
        Commands::New {
            name,
            description,
            tools,
            color,
            force,
        } => commands::new::run(
            commands::new::NewPersona {
                name,
                description,
                tools,
                color,
                force,
            },
            &ctx,
        ),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config.log_level, cli.verbose).context("Failed to setup logging")?;

    info!("Starting personas with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
