//! CLI subcommand implementations

pub mod completions;
pub mod config;
pub mod index;
pub mod list;
pub mod new;
pub mod prompt;
pub mod show;
pub mod tools;
pub mod validate;

use eyre::Result;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::persona::loader::{LoadReport, PersonaLoader};

/// Options every command sees
pub struct Context<'a> {
    pub config: &'a Config,
    pub dir: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context<'_> {
    pub fn root(&self) -> PathBuf {
        self.config.personas_root(self.dir.as_deref())
    }

    pub fn loader(&self) -> PersonaLoader {
        PersonaLoader::new(self.root(), &self.config.discovery)
    }

    /// Load every persona under the root
    pub fn load(&self) -> Result<(PersonaLoader, LoadReport)> {
        let mut loader = self.loader();
        let report = loader.load_all()?;
        Ok((loader, report))
    }
}

/// Display a path relative to `root` when possible
pub fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
