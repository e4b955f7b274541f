//! Validate persona documents

use colored::*;
use eyre::{Context as _, Result};
use std::path::PathBuf;

use super::{Context, display_path};
use crate::cli::OutputFormat;
use crate::persona::validate::{Severity, ValidationRules, validate};

pub fn run(paths: &[PathBuf], strict: bool, format: OutputFormat, ctx: &Context) -> Result<()> {
    let rules = ValidationRules::from_config(ctx.config).context("Invalid validation settings")?;

    let mut loader = ctx.loader();
    let report = if paths.is_empty() {
        loader.load_all()?
    } else {
        loader.load_paths(paths)?
    };
    let root = ctx.root();

    let result = validate(&report, &rules);
    log::info!(
        "Validated {} document(s): {} error(s), {} warning(s)",
        result.checked,
        result.error_count(),
        result.warning_count()
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&result)?),
        OutputFormat::Text => {
            if !ctx.quiet {
                for persona in &report.personas {
                    if !result.has_findings_for(&persona.path) {
                        println!("{} {}", "✓".green(), display_path(&persona.path, &root));
                    }
                }
            }

            for (path, diagnostics) in result.by_path() {
                let any_error = diagnostics.iter().any(|d| d.severity == Severity::Error);
                let mark = if any_error { "✗".red() } else { "⚠".yellow() };
                println!("{} {}", mark, display_path(path, &root));

                for d in diagnostics {
                    let label = match d.severity {
                        Severity::Error => "error".red().bold(),
                        Severity::Warning => "warning".yellow().bold(),
                    };
                    let location = d.line.map(|l| format!(":{}", l)).unwrap_or_default();
                    println!("    {}[{}]{} {}", label, d.rule.id().dimmed(), location, d.message);
                }
            }

            if !ctx.quiet {
                println!();
                if let Some(policy) = &rules.policy {
                    log::debug!("Content policy active with {} rule(s)", policy.rule_count());
                }
                println!(
                    "{} document(s) checked: {} error(s), {} warning(s)",
                    result.checked,
                    result.error_count(),
                    result.warning_count()
                );
            }
        }
    }

    if !result.is_ok(strict) {
        if strict && result.error_count() == 0 {
            eyre::bail!("Validation failed: {} warning(s) in strict mode", result.warning_count());
        }
        eyre::bail!("Validation failed: {} error(s)", result.error_count());
    }

    Ok(())
}
