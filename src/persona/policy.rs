//! Content policy for persona bodies
//!
//! Flags prose that tells a persona to drop its guard rails.

use eyre::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::PolicyConfig;

/// A named group of patterns
#[derive(Clone)]
struct PolicyRule {
    patterns: Vec<Regex>,
    description: String,
}

fn rule(patterns: &[&str], description: &str) -> PolicyRule {
    PolicyRule {
        patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        description: description.to_string(),
    }
}

static BUILTIN_RULES: Lazy<Vec<PolicyRule>> = Lazy::new(|| {
    vec![
        rule(
            &[
                r"(?i)\bignore\s+(all\s+)?(previous|prior|above|earlier)\s+(instructions|guidance|rules)",
                r"(?i)\bforget\s+(all\s+)?(your|previous)\s+instructions",
            ],
            "Instruction override",
        ),
        rule(
            &[
                r"(?i)\b(disregard|bypass|override|ignore)\s+(your\s+|all\s+|any\s+)?(safety|ethics|ethical|content)\s+(guidelines|policies|rules|constraints)",
                r"(?i)\bno\s+(ethical|moral|safety)\s+(limits|restrictions|boundaries)",
            ],
            "Safety bypass",
        ),
        rule(
            &[r"(?i)\b(reveal|print|disclose|leak)\s+(your\s+|the\s+)?(system\s+prompt|hidden\s+instructions)"],
            "System prompt disclosure",
        ),
        rule(
            &[
                r"(?i)\b(never|do\s+not|don't)\s+(include|add|give|mention)\s+(any\s+)?(ethics|ethical|legal|safety|medical)\s+disclaimers?",
            ],
            "Disclaimer suppression",
        ),
    ]
});

/// One policy hit in a document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    /// 1-based line within the body
    pub line: usize,
    pub description: String,
    pub excerpt: String,
}

/// Compiled content policy
pub struct ContentPolicy {
    rules: Vec<PolicyRule>,
}

impl ContentPolicy {
    /// Build the built-in rules plus any configured patterns
    pub fn new(config: &PolicyConfig) -> Result<Self> {
        let mut rules = BUILTIN_RULES.clone();

        for custom in &config.patterns {
            let regex = Regex::new(&format!("(?i){}", custom.pattern))
                .with_context(|| format!("Invalid policy pattern '{}'", custom.pattern))?;
            rules.push(PolicyRule {
                patterns: vec![regex],
                description: custom.description.clone(),
            });
        }

        Ok(Self { rules })
    }

    /// Check a body line by line; at most one hit per rule per line
    pub fn check(&self, body: &str) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();

        for (idx, line) in body.lines().enumerate() {
            for rule in &self.rules {
                if let Some(m) = rule.patterns.iter().find_map(|re| re.find(line)) {
                    violations.push(PolicyViolation {
                        line: idx + 1,
                        description: rule.description.clone(),
                        excerpt: m.as_str().to_string(),
                    });
                }
            }
        }

        violations
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
