use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "Personas Configuration".bold());
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
            println!();

            println!("{}:", "paths".cyan());
            println!("  personas: {}", config.paths.personas.display());
            println!();

            println!("{}:", "discovery".cyan());
            println!("  max_depth: {}", config.discovery.max_depth);
            println!("  ignore: {}", config.discovery.ignore.join(", "));
            println!();

            println!("{}:", "validation".cyan());
            println!("  allowed_tools: {}", config.validation.allowed_tools.join(", "));
            println!("  name_matches_file: {}", config.validation.name_matches_file);
            println!("  require_color: {}", config.validation.require_color);
            println!();

            println!("{}:", "policy".cyan());
            println!("  enabled: {}", config.policy.enabled);
            println!("  patterns: {}", config.policy.patterns.len());
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        "paths.personas" => Some(config.paths.personas.display().to_string()),
        "discovery.max_depth" => Some(config.discovery.max_depth.to_string()),
        "discovery.ignore" => Some(config.discovery.ignore.join(",")),
        "validation.allowed_tools" => Some(config.validation.allowed_tools.join(",")),
        "validation.name_matches_file" => Some(config.validation.name_matches_file.to_string()),
        "validation.require_color" => Some(config.validation.require_color.to_string()),
        "policy.enabled" => Some(config.policy.enabled.to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}
