//! Routing index generation
//!
//! Emits a compact description of every persona for an external router:
//! names, descriptions, tools and trigger words pulled from "use when"
//! style clauses. Nothing here picks a persona for a request.

use eyre::{Context, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::Persona;

/// A persona entry in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaIndexEntry {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Path relative to the personas root
    pub path: String,
    /// Keywords from "use when" / "use proactively for" clauses
    pub triggers: Vec<String>,
}

/// The complete index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaIndex {
    /// When the index was generated
    pub generated: String,
    pub total: usize,
    /// Personas keyed by lowercase name, in name order
    pub personas: IndexMap<String, PersonaIndexEntry>,
}

static TRIGGER_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\buse\s+(?:this\s+(?:agent|persona)\s+)?(?:proactively\s+)?(?:when|for|after|to)\b([^.\n]*)")
        .unwrap()
});

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "when", "user", "users", "asks", "about", "any", "you", "your", "are", "that", "this",
    "need", "needs", "into", "from", "all", "like", "such", "other", "its", "has", "have", "who", "use",
];

fn normalize_word(word: &str) -> String {
    let w = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
    if let Some(stem) = w.strip_suffix("ies").filter(|s| s.len() > 2) {
        format!("{}y", stem)
    } else if w.ends_with('s') && !w.ends_with("ss") && w.len() > 3 {
        w[..w.len() - 1].to_string()
    } else {
        w
    }
}

/// Extract trigger words from a description
pub fn extract_triggers(description: &str) -> Vec<String> {
    let mut triggers = Vec::new();

    for caps in TRIGGER_CLAUSE.captures_iter(description) {
        let clause = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        triggers.extend(
            clause
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == '/')
                .map(normalize_word)
                .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.as_str())),
        );
    }

    triggers.sort();
    triggers.dedup();
    triggers
}

/// Build an index from loaded personas
pub fn build_index(personas: &[Persona]) -> PersonaIndex {
    let mut sorted: Vec<&Persona> = personas.iter().filter(|p| !p.name().trim().is_empty()).collect();
    sorted.sort_by_key(|p| p.name().to_lowercase());

    let mut entries = IndexMap::new();
    for persona in sorted {
        let key = persona.name().to_lowercase();
        if entries.contains_key(&key) {
            log::warn!(
                "Skipping duplicate persona '{}' at {} in index",
                persona.name(),
                persona.path.display()
            );
            continue;
        }

        entries.insert(
            key,
            PersonaIndexEntry {
                name: persona.name().to_string(),
                description: persona.description().trim().to_string(),
                tools: persona.tools().to_vec(),
                color: persona.header.color.clone(),
                path: persona.relative_path.to_string_lossy().replace('\\', "/"),
                triggers: extract_triggers(persona.description()),
            },
        );
    }

    PersonaIndex {
        generated: chrono::Utc::now().to_rfc3339(),
        total: entries.len(),
        personas: entries,
    }
}

/// Serialize the index as JSON or YAML depending on the file extension
pub fn render_index(index: &PersonaIndex, as_json: bool) -> Result<String> {
    if as_json {
        serde_json::to_string_pretty(index).context("Failed to serialize index as JSON")
    } else {
        serde_yaml::to_string(index).context("Failed to serialize index as YAML")
    }
}

/// Write the index to a file; `.json` selects JSON, anything else YAML
pub fn write_index(index: &PersonaIndex, output_path: &Path) -> Result<()> {
    let as_json = output_path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let content = render_index(index, as_json)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(output_path, content).with_context(|| format!("Failed to write index to {}", output_path.display()))?;

    Ok(())
}

/// Truncate to `max` characters, appending "..." when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Markdown table of personas for an external prompt
pub fn context_snippet(index: &PersonaIndex) -> String {
    let mut lines = vec![
        "## Available Personas".to_string(),
        String::new(),
        "| Persona | Description | Tools |".to_string(),
        "|---------|-------------|-------|".to_string(),
    ];

    for entry in index.personas.values() {
        let tools = if entry.tools.is_empty() {
            "-".to_string()
        } else {
            entry.tools.join(", ")
        };
        let desc = truncate(&entry.description.replace('\n', " ").replace('|', "\\|"), 80);
        lines.push(format!("| **{}** | {} | {} |", entry.name, desc, tools));
    }

    lines.join("\n")
}
