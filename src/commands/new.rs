//! Scaffold a new persona document

use colored::*;
use eyre::{Context as _, Result};
use lazy_regex::regex_is_match;
use std::fs;

use super::Context;
use crate::persona::PersonaHeader;
use crate::persona::template::render_template;

pub struct NewPersona {
    pub name: String,
    pub description: Option<String>,
    pub tools: Vec<String>,
    pub color: Option<String>,
    pub force: bool,
}

pub fn run(new: NewPersona, ctx: &Context) -> Result<()> {
    if !regex_is_match!(r"^[a-z0-9]+(-[a-z0-9]+)*$", &new.name) {
        eyre::bail!("Persona name '{}' must be a lowercase kebab-case slug", new.name);
    }

    let root = ctx.root();
    fs::create_dir_all(&root).with_context(|| format!("Failed to create personas directory: {}", root.display()))?;

    let path = root.join(format!("{}.md", new.name));
    if path.exists() && !new.force {
        eyre::bail!(
            "Persona '{}' already exists at {}\nUse --force to overwrite it.",
            new.name,
            path.display()
        );
    }

    let header = PersonaHeader {
        description: new
            .description
            .unwrap_or_else(|| format!("Describe when the {} persona should be used", new.name)),
        name: new.name,
        tools: new.tools.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
        color: new.color,
        ..Default::default()
    };

    let content = render_template(&header)?;
    fs::write(&path, content).with_context(|| format!("Failed to write persona: {}", path.display()))?;
    log::info!("Created persona {} at {}", header.name, path.display());

    if !ctx.quiet {
        println!("{} Created persona: {}", "✓".green(), path.display());
        println!();
        println!("Next steps:");
        println!("  1. Edit {} to describe the role", path.display());
        println!("  2. Run {} to check it", "personas validate".cyan());
    }

    Ok(())
}
