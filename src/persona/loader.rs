//! Persona discovery and loading

use eyre::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::Persona;
use super::header::parse_file;
use crate::config::DiscoveryConfig;

/// A document that could not be loaded
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: eyre::Report,
}

/// Outcome of loading a set of documents
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Parsed personas, sorted by case-insensitive name then path
    pub personas: Vec<Persona>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// Number of documents looked at
    pub fn total(&self) -> usize {
        self.personas.len() + self.failures.len()
    }
}

/// Loader for discovering persona documents below a root directory
pub struct PersonaLoader {
    root: PathBuf,
    max_depth: usize,
    ignore: Vec<String>,
    cache: HashMap<String, usize>,
    loaded: Vec<Persona>,
}

impl PersonaLoader {
    pub fn new(root: PathBuf, discovery: &DiscoveryConfig) -> Self {
        Self {
            root,
            max_depth: discovery.max_depth,
            ignore: discovery.ignore.clone(),
            cache: HashMap::new(),
            loaded: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find every persona document below the root
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();

        if !self.root.exists() {
            log::debug!("Personas root does not exist: {}", self.root.display());
            return found;
        }

        if self.root.is_file() {
            found.push(self.root.clone());
            return found;
        }

        let walker = WalkDir::new(&self.root)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(should_enter);

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::debug!("Error walking directory: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_persona_file(entry.path()) {
                found.push(entry.into_path());
            }
        }

        found.sort();
        found
    }

    fn is_persona_file(&self, path: &Path) -> bool {
        let is_markdown = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false);
        if !is_markdown {
            return false;
        }

        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        !self.ignore.iter().any(|i| i.eq_ignore_ascii_case(&file_name))
    }

    /// Load every discovered document
    pub fn load_all(&mut self) -> Result<LoadReport> {
        let files = self.discover();
        log::info!("Discovered {} persona file(s) in {}", files.len(), self.root.display());
        self.load_files(&files)
    }

    /// Load specific files or directories; directories are walked like the root
    pub fn load_paths(&mut self, paths: &[PathBuf]) -> Result<LoadReport> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                let sub = PersonaLoader {
                    root: path.clone(),
                    max_depth: self.max_depth,
                    ignore: self.ignore.clone(),
                    cache: HashMap::new(),
                    loaded: Vec::new(),
                };
                files.extend(sub.discover());
            } else if path.exists() {
                files.push(path.clone());
            } else {
                eyre::bail!("Path does not exist: {}", path.display());
            }
        }
        files.sort();
        files.dedup();
        self.load_files(&files)
    }

    fn load_files(&mut self, files: &[PathBuf]) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for path in files {
            match parse_file(path, &self.root) {
                Ok(persona) => report.personas.push(persona),
                Err(e) => {
                    log::warn!("Failed to load persona from {}: {:#}", path.display(), e);
                    report.failures.push(LoadFailure {
                        path: path.clone(),
                        error: e,
                    });
                }
            }
        }

        // Same key the duplicate-name rule compares on
        report
            .personas
            .sort_by_cached_key(|p| (p.name().trim().to_lowercase(), p.path.clone()));

        self.loaded = report.personas.clone();
        self.cache.clear();
        for (i, persona) in self.loaded.iter().enumerate() {
            // First document wins when names collide
            self.cache.entry(persona.name().to_string()).or_insert(i);
        }

        Ok(report)
    }

    /// Get a loaded persona by name, exact match first then case-insensitive
    pub fn get(&self, name: &str) -> Option<&Persona> {
        if let Some(&i) = self.cache.get(name) {
            return self.loaded.get(i);
        }
        self.loaded.iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

/// Check if we should enter a directory during discovery
fn should_enter(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    let name = entry.file_name().to_string_lossy();

    if name.starts_with('.') {
        return false;
    }

    !(entry.file_type().is_dir() && matches!(name.as_ref(), "node_modules" | "target"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_persona(dir: &Path, file: &str, name: &str, description: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(file);
        fs::write(
            &path,
            format!("---\nname: {}\ndescription: {}\n---\n\nYou are {}.\n", name, description, name),
        )
        .unwrap();
        path
    }

    fn loader(root: &Path) -> PersonaLoader {
        PersonaLoader::new(root.to_path_buf(), &DiscoveryConfig::default())
    }

    #[test]
    fn test_load_all_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        write_persona(temp.path(), "b.md", "legal-expert", "Contracts");
        write_persona(temp.path(), "a.md", "ui-designer", "Interfaces");
        write_persona(&temp.path().join("data"), "analyst.md", "data-analyst", "SQL");

        let report = loader(temp.path()).load_all().unwrap();
        let names: Vec<&str> = report.personas.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["data-analyst", "legal-expert", "ui-designer"]);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_sort_ignores_name_case() {
        let temp = TempDir::new().unwrap();
        write_persona(&temp.path().join("z"), "reviewer.md", "Reviewer", "Upper");
        write_persona(&temp.path().join("a"), "reviewer.md", "reviewer", "Lower");
        write_persona(temp.path(), "auditor.md", "auditor", "Audits");

        let report = loader(temp.path()).load_all().unwrap();
        let paths: Vec<&Path> = report.personas.iter().map(|p| p.relative_path.as_path()).collect();
        assert_eq!(
            paths,
            vec![
                Path::new("auditor.md"),
                Path::new("a/reviewer.md"),
                Path::new("z/reviewer.md"),
            ]
        );
    }

    #[test]
    fn test_skips_ignored_hidden_and_non_markdown() {
        let temp = TempDir::new().unwrap();
        write_persona(temp.path(), "analyst.md", "analyst", "Data");
        fs::write(temp.path().join("README.md"), "# Agents\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "not markdown").unwrap();
        write_persona(&temp.path().join(".git"), "hidden.md", "hidden", "Hidden");
        write_persona(&temp.path().join("node_modules"), "dep.md", "dep", "Dep");

        let files = loader(temp.path()).discover();
        assert_eq!(files, vec![temp.path().join("analyst.md")]);
    }

    #[test]
    fn test_failures_do_not_abort() {
        let temp = TempDir::new().unwrap();
        write_persona(temp.path(), "ok.md", "ok", "Fine");
        fs::write(temp.path().join("broken.md"), "no header at all").unwrap();

        let report = loader(temp.path()).load_all().unwrap();
        assert_eq!(report.personas.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, temp.path().join("broken.md"));
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_respects_max_depth() {
        let temp = TempDir::new().unwrap();
        let deep = temp.path().join("a").join("b").join("c");
        write_persona(&deep, "deep.md", "deep", "Too deep");

        let report = loader(temp.path()).load_all().unwrap();
        assert!(report.personas.is_empty());

        let discovery = DiscoveryConfig {
            max_depth: 5,
            ..Default::default()
        };
        let report = PersonaLoader::new(temp.path().to_path_buf(), &discovery)
            .load_all()
            .unwrap();
        assert_eq!(report.personas.len(), 1);
    }

    #[test]
    fn test_get_exact_then_case_insensitive() {
        let temp = TempDir::new().unwrap();
        write_persona(temp.path(), "qa.md", "QA-Lead", "Testing");

        let mut loader = loader(temp.path());
        loader.load_all().unwrap();
        assert!(loader.get("QA-Lead").is_some());
        assert!(loader.get("qa-lead").is_some());
        assert!(loader.get("missing").is_none());
    }

    #[test]
    fn test_load_paths_mixed() {
        let temp = TempDir::new().unwrap();
        let single = write_persona(temp.path(), "one.md", "one", "First");
        write_persona(&temp.path().join("team"), "two.md", "two", "Second");

        let mut loader = loader(temp.path());
        let report = loader
            .load_paths(&[single.clone(), temp.path().join("team"), single])
            .unwrap();
        assert_eq!(report.personas.len(), 2);

        assert!(loader.load_paths(&[temp.path().join("nope.md")]).is_err());
    }

    #[test]
    fn test_nonexistent_root() {
        let report = loader(Path::new("/nonexistent/agents")).load_all().unwrap();
        assert_eq!(report.total(), 0);
    }
}
