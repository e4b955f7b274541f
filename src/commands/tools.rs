//! Tool usage across personas

use colored::*;
use eyre::Result;
use indexmap::IndexMap;
use serde::Serialize;

use super::Context;
use crate::cli::OutputFormat;
use crate::persona::{Persona, tool_base_name};
use crate::persona::validate::ToolSet;

#[derive(Debug, Serialize, PartialEq)]
struct ToolUsage {
    tool: String,
    known: bool,
    personas: Vec<String>,
}

fn collect_usage(personas: &[Persona], known: &ToolSet) -> Vec<ToolUsage> {
    let mut usage: IndexMap<String, Vec<String>> = IndexMap::new();

    for persona in personas {
        for tool in persona.tools() {
            let base = tool_base_name(tool).to_string();
            let names = usage.entry(base).or_default();
            if !names.iter().any(|n| n == persona.name()) {
                names.push(persona.name().to_string());
            }
        }
    }

    usage.sort_keys();
    usage
        .into_iter()
        .map(|(tool, personas)| ToolUsage {
            known: known.is_empty() || known.allows(&tool),
            tool,
            personas,
        })
        .collect()
}

pub fn run(format: OutputFormat, ctx: &Context) -> Result<()> {
    let (_, report) = ctx.load()?;
    let known = ToolSet::new(ctx.config.validation.allowed_tools.as_slice());
    let usage = collect_usage(&report.personas, &known);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&usage)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&usage)?),
        OutputFormat::Text => {
            if usage.is_empty() {
                println!("No tools declared.");
                return Ok(());
            }

            println!("{}", "Declared Tools:".bold());
            println!();
            for entry in &usage {
                let mark = if entry.known { "✓".green() } else { "✗".red() };
                println!(
                    "  {} {} ({})",
                    mark,
                    entry.tool.bold(),
                    entry.personas.len().to_string().cyan()
                );
                if ctx.verbose {
                    println!("    {}", entry.personas.join(", ").dimmed());
                }
            }

            let unknown = usage.iter().filter(|u| !u.known).count();
            if unknown > 0 {
                println!();
                println!("{} {} unknown tool(s)", "⚠".yellow(), unknown);
            }
        }
    }

    Ok(())
}
