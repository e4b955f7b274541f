//! Persona template generation
//!
//! Generates a new persona document with a valid header.

use eyre::{Context, Result};

use super::PersonaHeader;

/// Convert a slug to a title: `data-analyst` -> `Data Analyst`
pub fn title_case(name: &str) -> String {
    name.split(&['-', '_'][..])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a persona document for a new role
pub fn render_template(header: &PersonaHeader) -> Result<String> {
    let yaml = serde_yaml::to_string(header).context("Failed to serialize persona header")?;
    let title = title_case(&header.name);

    Ok(format!(
        r#"---
{yaml}---

# {title}

You are a {title}. [Describe the role, its scope and what it is responsible for.]

## Core Competencies

- [Key area of expertise]
- [Key area of expertise]

## Communication Style

- [How this persona talks to users and to other agents]

## Success Metrics

- [What a good outcome looks like]
"#
    ))
}
