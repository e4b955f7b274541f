//! Show a single persona

use colored::*;
use eyre::Result;
use serde::Serialize;

use super::Context;
use crate::cli::OutputFormat;
use crate::persona::PersonaHeader;

#[derive(Serialize)]
struct PersonaDetails<'a> {
    #[serde(flatten)]
    header: &'a PersonaHeader,
    path: String,
    body_lines: usize,
}

pub fn run(name: &str, format: OutputFormat, ctx: &Context) -> Result<()> {
    let (loader, _) = ctx.load()?;

    let persona = loader
        .get(name)
        .ok_or_else(|| eyre::eyre!("Persona '{}' not found in {}", name, loader.root().display()))?;

    let details = PersonaDetails {
        header: &persona.header,
        path: persona.path.display().to_string(),
        body_lines: persona.prompt().lines().count(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&details)?),
        OutputFormat::Text => {
            println!("{} {}", "Persona:".bold(), persona.name().green().bold());
            println!();
            println!("{} {}", "Description:".bold(), persona.description().trim());

            println!();
            if persona.tools().is_empty() {
                println!("{} {}", "Tools:".bold(), "(none)".dimmed());
            } else {
                println!("{}", "Tools:".bold());
                for tool in persona.tools() {
                    println!("  {} {}", "•".cyan(), tool);
                }
            }

            if let Some(ref color) = persona.header.color {
                println!();
                println!("{} {}", "Color:".bold(), color.magenta());
            }

            if !persona.header.extra.is_empty() {
                println!();
                println!("{}", "Other fields:".bold());
                for (key, value) in &persona.header.extra {
                    let rendered = serde_yaml::to_string(value)?;
                    println!("  {}: {}", key, rendered.trim());
                }
            }

            println!();
            println!("{} {}", "Path:".bold(), persona.path.display());
            println!("{} {} line(s)", "Body:".bold(), details.body_lines);
        }
    }

    Ok(())
}
