//! List persona documents

use colored::*;
use eyre::Result;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use super::{Context, display_path};
use crate::cli::OutputFormat;
use crate::persona::Persona;
use crate::persona::index::truncate;

/// Serializable persona summary for JSON/YAML output
#[derive(Serialize)]
struct PersonaSummary {
    name: String,
    description: String,
    tools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    path: String,
}

impl From<&Persona> for PersonaSummary {
    fn from(p: &Persona) -> Self {
        Self {
            name: p.name().to_string(),
            description: p.description().trim().to_string(),
            tools: p.tools().to_vec(),
            color: p.header.color.clone(),
            path: p.path.display().to_string(),
        }
    }
}

/// Get terminal width, defaulting to 80 if not available
fn get_terminal_width() -> usize {
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80)
}

pub fn run(format: OutputFormat, tool: Option<&str>, ctx: &Context) -> Result<()> {
    let (_, report) = ctx.load()?;
    let root = ctx.root();

    let personas: Vec<&Persona> = report
        .personas
        .iter()
        .filter(|p| tool.map(|t| p.declares_tool(t)).unwrap_or(true))
        .collect();

    match format {
        OutputFormat::Json => {
            let summaries: Vec<PersonaSummary> = personas.iter().map(|p| PersonaSummary::from(*p)).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Yaml => {
            let summaries: Vec<PersonaSummary> = personas.iter().map(|p| PersonaSummary::from(*p)).collect();
            println!("{}", serde_yaml::to_string(&summaries)?);
        }
        OutputFormat::Text => {
            if personas.is_empty() {
                println!("  {} No personas found in {}", "(none)".dimmed(), root.display());
                println!();
                println!("  Create one with: {}", "personas new <name>".cyan());
                return Ok(());
            }

            let width = get_terminal_width().saturating_sub(6).max(20);
            for persona in &personas {
                println!("  {} {}", "●".green(), persona.name().bold());
                println!("    {}", truncate(persona.description().trim(), width).dimmed());
                if ctx.verbose {
                    if !persona.tools().is_empty() {
                        println!("    Tools: {}", persona.tools().join(", ").cyan());
                    }
                    if let Some(ref color) = persona.header.color {
                        println!("    Color: {}", color.magenta());
                    }
                    println!("    Path: {}", display_path(&persona.path, &root));
                }
            }

            println!();
            println!("Total: {} persona(s)", personas.len());
            if !report.failures.is_empty() {
                println!(
                    "{} {} document(s) failed to load; run {} for details",
                    "⚠".yellow(),
                    report.failures.len(),
                    "personas validate".cyan()
                );
            }
        }
    }

    Ok(())
}
