//! Routing index output

use colored::*;
use eyre::{Context as _, Result};
use std::path::Path;

use super::Context;
use crate::cli::OutputFormat;
use crate::persona::index::{build_index, context_snippet, render_index, write_index};

pub fn run(output: Option<&Path>, snippet: bool, format: Option<OutputFormat>, ctx: &Context) -> Result<()> {
    let (_, report) = ctx.load()?;

    if !report.failures.is_empty() {
        log::warn!("{} document(s) skipped while indexing", report.failures.len());
    }

    let index = build_index(&report.personas);

    if snippet {
        let text = context_snippet(&index);
        match output {
            Some(path) => {
                std::fs::write(path, text)
                    .with_context(|| format!("Failed to write snippet to {}", path.display()))?;
                if !ctx.quiet {
                    println!("{} Wrote snippet to {}", "✓".green(), path.display());
                }
            }
            None => println!("{}", text),
        }
        return Ok(());
    }

    match output {
        Some(path) => {
            write_index(&index, path)?;
            if !ctx.quiet {
                println!(
                    "{} Indexed {} persona(s) to {}",
                    "✓".green(),
                    index.total,
                    path.display()
                );
            }
        }
        None => {
            // Text has no structured form here; YAML is the readable one
            let as_json = matches!(format, Some(OutputFormat::Json));
            println!("{}", render_index(&index, as_json)?.trim_end());
        }
    }

    Ok(())
}
