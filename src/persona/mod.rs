//! Persona documents
//!
//! A persona is a Markdown file with a small YAML header followed by free
//! prose. The prose is opaque: it is handed to the agent runtime verbatim.
//!
//! ```markdown
//! ---
//! name: data-analyst
//! description: Expert data analyst. Use PROACTIVELY for SQL and dashboards.
//! tools: Read, Grep, Bash
//! color: "#3b82f6"
//! ---
//!
//! You are a senior data analyst...
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

pub mod header;
pub mod index;
pub mod loader;
pub mod policy;
pub mod template;
pub mod validate;

/// Structured metadata at the top of a persona document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaHeader {
    /// Persona identifier (slug)
    #[serde(default)]
    pub name: String,

    /// One-line summary used by external routers
    #[serde(default)]
    pub description: String,

    /// Capabilities the persona may invoke
    #[serde(default, deserialize_with = "deserialize_tools", skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Cosmetic UI hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Any other keys, kept in document order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// Accepts `tools: [A, B]`, `tools: A, B` or nothing at all
fn deserialize_tools<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tools {
        List(Vec<String>),
        Csv(String),
    }

    let tools = Option::<Tools>::deserialize(deserializer)?;
    let raw = match tools {
        None => Vec::new(),
        Some(Tools::List(list)) => list,
        Some(Tools::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(raw
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// Strip a scope suffix: `Bash(git:*)` -> `Bash`
pub fn tool_base_name(tool: &str) -> &str {
    tool.split('(').next().unwrap_or(tool).trim()
}

/// A loaded persona document
#[derive(Debug, Clone)]
pub struct Persona {
    pub header: PersonaHeader,
    /// Header block exactly as written, without delimiters
    pub raw_header: String,
    /// Prose after the header
    pub body: String,
    /// 1-based line in the file where the body starts
    pub body_line: usize,
    /// Path to the document
    pub path: PathBuf,
    /// Path relative to the scanned root
    pub relative_path: PathBuf,
}

impl Persona {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn description(&self) -> &str {
        &self.header.description
    }

    pub fn tools(&self) -> &[String] {
        &self.header.tools
    }

    /// Whether the persona declares `tool` (compared by base name)
    pub fn declares_tool(&self, tool: &str) -> bool {
        let wanted = tool_base_name(tool);
        self.header.tools.iter().any(|t| tool_base_name(t) == wanted)
    }

    /// File name without extension
    pub fn file_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// The text injected into a prompt context
    pub fn prompt(&self) -> &str {
        self.body.trim()
    }
}

/// Render a persona for injection, optionally prefixed with its identity
pub fn render_prompt(persona: &Persona, with_header: bool) -> String {
    if !with_header {
        return persona.prompt().to_string();
    }

    let mut parts = vec![format!("# {}", persona.name())];
    if !persona.description().is_empty() {
        parts.push(persona.description().trim().to_string());
    }
    parts.push(persona.prompt().to_string());
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(header: PersonaHeader, body: &str) -> Persona {
        Persona {
            header,
            raw_header: String::new(),
            body: body.to_string(),
            body_line: 4,
            path: PathBuf::from("/agents/data-analyst.md"),
            relative_path: PathBuf::from("data-analyst.md"),
        }
    }

    #[test]
    fn test_tools_as_list() {
        let header: PersonaHeader = serde_yaml::from_str("name: a\ntools:\n  - Read\n  - Write\n").unwrap();
        assert_eq!(header.tools, vec!["Read", "Write"]);
    }

    #[test]
    fn test_tools_as_comma_string() {
        let header: PersonaHeader = serde_yaml::from_str("name: a\ntools: Read, Grep ,Bash(git:*),\n").unwrap();
        assert_eq!(header.tools, vec!["Read", "Grep", "Bash(git:*)"]);
    }

    #[test]
    fn test_tools_absent_or_null() {
        let header: PersonaHeader = serde_yaml::from_str("name: a").unwrap();
        assert!(header.tools.is_empty());

        let header: PersonaHeader = serde_yaml::from_str("name: a\ntools:\n").unwrap();
        assert!(header.tools.is_empty());

        let header: PersonaHeader = serde_yaml::from_str("name: a\ntools: \"\"\n").unwrap();
        assert!(header.tools.is_empty());
    }

    #[test]
    fn test_extra_keys_preserved_in_order() {
        let header: PersonaHeader = serde_yaml::from_str("name: a\nmodel: sonnet\nversion: 2\n").unwrap();
        let keys: Vec<&String> = header.extra.keys().collect();
        assert_eq!(keys, vec!["model", "version"]);
    }

    #[test]
    fn test_tool_base_name() {
        assert_eq!(tool_base_name("Bash(git:*)"), "Bash");
        assert_eq!(tool_base_name("Read"), "Read");
        assert_eq!(tool_base_name(" WebFetch (domain:docs.rs)"), "WebFetch");
    }

    #[test]
    fn test_declares_tool_by_base_name() {
        let p = persona(
            PersonaHeader {
                name: "data-analyst".into(),
                tools: vec!["Bash(psql:*)".into(), "Read".into()],
                ..Default::default()
            },
            "body",
        );
        assert!(p.declares_tool("Bash"));
        assert!(p.declares_tool("Read"));
        assert!(!p.declares_tool("Write"));
    }

    #[test]
    fn test_render_prompt() {
        let p = persona(
            PersonaHeader {
                name: "data-analyst".into(),
                description: "Expert in SQL".into(),
                ..Default::default()
            },
            "\nYou are a senior data analyst.\n\n",
        );

        assert_eq!(render_prompt(&p, false), "You are a senior data analyst.");
        assert_eq!(
            render_prompt(&p, true),
            "# data-analyst\n\nExpert in SQL\n\nYou are a senior data analyst."
        );
        assert_eq!(p.file_stem(), Some("data-analyst"));
    }
}
