//! Document hygiene checks
//!
//! Findings are data, not errors: every rule produces [`Diagnostic`]s and the
//! caller decides whether errors (or warnings, in strict mode) fail the run.

use eyre::Result;
use lazy_regex::regex_is_match;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::loader::LoadReport;
use super::policy::ContentPolicy;
use super::{Persona, tool_base_name};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Stable identifiers for each check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    HeaderParse,
    NameEmpty,
    DescriptionEmpty,
    NameFormat,
    NameMismatch,
    UnknownTool,
    DuplicateTool,
    DuplicateName,
    ColorFormat,
    ColorMissing,
    BodyEmpty,
    ContentPolicy,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Rule::HeaderParse => "header-parse",
            Rule::NameEmpty => "name-empty",
            Rule::DescriptionEmpty => "description-empty",
            Rule::NameFormat => "name-format",
            Rule::NameMismatch => "name-mismatch",
            Rule::UnknownTool => "unknown-tool",
            Rule::DuplicateTool => "duplicate-tool",
            Rule::DuplicateName => "duplicate-name",
            Rule::ColorFormat => "color-format",
            Rule::ColorMissing => "color-missing",
            Rule::BodyEmpty => "body-empty",
            Rule::ContentPolicy => "content-policy",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A single finding against one document
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub rule: Rule,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

/// Tool names a persona may declare
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl ToolSet {
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut set = ToolSet::default();
        for entry in entries {
            let entry = entry.as_ref().trim();
            match entry.strip_suffix('*') {
                Some(prefix) => set.prefixes.push(prefix.to_string()),
                None => {
                    set.exact.insert(entry.to_string());
                }
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }

    /// Whether a declared tool (possibly scoped, e.g. `Bash(git:*)`) is known
    pub fn allows(&self, tool: &str) -> bool {
        let base = tool_base_name(tool);
        self.exact.contains(base) || self.prefixes.iter().any(|p| base.starts_with(p.as_str()))
    }
}

/// Named colors accepted alongside hex values
const NAMED_COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "purple", "pink", "cyan", "magenta", "white", "black", "gray", "grey",
];

/// Everything the validator needs to know
pub struct ValidationRules {
    pub tools: ToolSet,
    pub name_matches_file: bool,
    pub require_color: bool,
    pub policy: Option<ContentPolicy>,
}

impl ValidationRules {
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = if config.policy.enabled {
            Some(ContentPolicy::new(&config.policy)?)
        } else {
            None
        };

        Ok(Self {
            tools: ToolSet::new(config.validation.allowed_tools.as_slice()),
            name_matches_file: config.validation.name_matches_file,
            require_color: config.validation.require_color,
            policy,
        })
    }
}

/// Result of validating a set of documents
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    /// Number of documents checked (including ones that failed to parse)
    pub checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// No errors; with `strict`, no warnings either
    pub fn is_ok(&self, strict: bool) -> bool {
        if strict {
            self.diagnostics.is_empty()
        } else {
            self.error_count() == 0
        }
    }

    /// Diagnostics grouped by document, in path order
    pub fn by_path(&self) -> Vec<(&Path, Vec<&Diagnostic>)> {
        let mut grouped: Vec<(&Path, Vec<&Diagnostic>)> = Vec::new();
        let mut paths: Vec<&Path> = self.diagnostics.iter().map(|d| d.path.as_path()).collect();
        paths.sort();
        paths.dedup();

        for path in paths {
            let diags = self.diagnostics.iter().filter(|d| d.path == path).collect();
            grouped.push((path, diags));
        }
        grouped
    }

    pub fn has_findings_for(&self, path: &Path) -> bool {
        self.diagnostics.iter().any(|d| d.path == path)
    }
}

/// Run every rule over a load report
pub fn validate(report: &LoadReport, rules: &ValidationRules) -> ValidationReport {
    let mut out = ValidationReport {
        checked: report.total(),
        diagnostics: Vec::new(),
    };

    for failure in &report.failures {
        out.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            rule: Rule::HeaderParse,
            path: failure.path.clone(),
            persona: None,
            line: None,
            message: root_cause(&failure.error),
        });
    }

    let mut seen: HashMap<String, &Path> = HashMap::new();

    for persona in &report.personas {
        check_persona(persona, rules, &mut out.diagnostics);

        let key = persona.name().trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match seen.get(&key) {
            Some(first) => out.diagnostics.push(diag(
                persona,
                Severity::Error,
                Rule::DuplicateName,
                format!("Name '{}' is already declared by {}", persona.name(), first.display()),
            )),
            None => {
                seen.insert(key, persona.path.as_path());
            }
        }
    }

    out.diagnostics
        .sort_by(|a, b| a.path.cmp(&b.path).then_with(|| b.severity.cmp(&a.severity)));
    out
}

fn check_persona(persona: &Persona, rules: &ValidationRules, out: &mut Vec<Diagnostic>) {
    let name = persona.name().trim();

    if name.is_empty() {
        out.push(diag(persona, Severity::Error, Rule::NameEmpty, "Header has no name".to_string()));
    } else {
        if !regex_is_match!(r"^[a-z0-9]+(-[a-z0-9]+)*$", name) {
            out.push(diag(
                persona,
                Severity::Warning,
                Rule::NameFormat,
                format!("Name '{}' is not a lowercase kebab-case slug", name),
            ));
        }

        if rules.name_matches_file {
            if let Some(stem) = persona.file_stem() {
                if stem != name {
                    out.push(diag(
                        persona,
                        Severity::Warning,
                        Rule::NameMismatch,
                        format!("Name '{}' does not match file name '{}'", name, stem),
                    ));
                }
            }
        }
    }

    if persona.description().trim().is_empty() {
        out.push(diag(
            persona,
            Severity::Error,
            Rule::DescriptionEmpty,
            "Header has no description".to_string(),
        ));
    }

    check_tools(persona, rules, out);
    check_color(persona, rules, out);

    if persona.prompt().is_empty() {
        out.push(diag(
            persona,
            Severity::Warning,
            Rule::BodyEmpty,
            "Document has no body text".to_string(),
        ));
    }

    if let Some(policy) = &rules.policy {
        for violation in policy.check(&persona.body) {
            let mut d = diag(
                persona,
                Severity::Error,
                Rule::ContentPolicy,
                format!("{}: \"{}\"", violation.description, violation.excerpt),
            );
            d.line = Some(body_line_in_file(persona, violation.line));
            out.push(d);
        }
    }
}

fn check_tools(persona: &Persona, rules: &ValidationRules, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();

    for tool in persona.tools() {
        if !rules.tools.is_empty() && !rules.tools.allows(tool) {
            out.push(diag(
                persona,
                Severity::Error,
                Rule::UnknownTool,
                format!("Unknown tool '{}'", tool),
            ));
        }

        if !seen.insert(tool.as_str()) {
            out.push(diag(
                persona,
                Severity::Warning,
                Rule::DuplicateTool,
                format!("Tool '{}' is declared more than once", tool),
            ));
        }
    }
}

fn check_color(persona: &Persona, rules: &ValidationRules, out: &mut Vec<Diagnostic>) {
    match persona.header.color.as_deref().map(str::trim) {
        Some(color) => {
            let is_hex = regex_is_match!(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$", color);
            let is_named = NAMED_COLORS.iter().any(|c| c.eq_ignore_ascii_case(color));
            if !is_hex && !is_named {
                out.push(diag(
                    persona,
                    Severity::Warning,
                    Rule::ColorFormat,
                    format!("Color '{}' is neither #rgb/#rrggbb hex nor a known color name", color),
                ));
            }
        }
        None => {
            // `color: #abc` without quotes is a YAML comment, so the value vanishes
            if regex_is_match!(r"(?m)^color:\s*#", &persona.raw_header) {
                out.push(diag(
                    persona,
                    Severity::Warning,
                    Rule::ColorFormat,
                    "Unquoted hex color is read as a YAML comment; quote it".to_string(),
                ));
            } else if rules.require_color {
                out.push(diag(
                    persona,
                    Severity::Warning,
                    Rule::ColorMissing,
                    "Header has no color".to_string(),
                ));
            }
        }
    }
}

/// Map a 1-based body line to a 1-based file line
fn body_line_in_file(persona: &Persona, body_line: usize) -> usize {
    persona.body_line + body_line - 1
}

fn diag(persona: &Persona, severity: Severity, rule: Rule, message: String) -> Diagnostic {
    Diagnostic {
        severity,
        rule,
        path: persona.path.clone(),
        persona: if persona.name().is_empty() {
            None
        } else {
            Some(persona.name().to_string())
        },
        line: None,
        message,
    }
}

/// Drop the outermost "Failed to parse ... in <path>" layer; the path is shown anyway
fn root_cause(error: &eyre::Report) -> String {
    let causes: Vec<String> = error.chain().skip(1).map(|e| e.to_string()).collect();
    if causes.is_empty() { error.to_string() } else { causes.join(": ") }
}
