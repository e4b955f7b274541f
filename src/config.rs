use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main personas configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub paths: PathsConfig,
    pub discovery: DiscoveryConfig,
    pub validation: ValidationConfig,
    pub policy: PolicyConfig,
}

/// Log level for the file logger (overridden by RUST_LOG)
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory holding persona documents
    pub personas: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// How deep to walk below the personas root
    pub max_depth: usize,
    /// File names that are never treated as personas
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Known tool names; a trailing `*` makes an entry a prefix pattern.
    /// An empty list disables the unknown-tool check.
    pub allowed_tools: Vec<String>,
    /// Warn when a persona's name differs from its file stem
    pub name_matches_file: bool,
    /// Treat a missing color as a warning
    pub require_color: bool,
}

/// A user-supplied content policy pattern
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PolicyPattern {
    pub pattern: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub enabled: bool,
    /// Extra patterns checked in addition to the built-in ones
    pub patterns: Vec<PolicyPattern>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            paths: PathsConfig::default(),
            discovery: DiscoveryConfig::default(),
            validation: ValidationConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            personas: Config::personas_dir().join("agents"),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            ignore: ["README.md", "CHANGELOG.md", "LICENSE.md", "CONTRIBUTING.md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Tool names understood by the agent runtime out of the box
pub const DEFAULT_TOOLS: &[&str] = &[
    "Read",
    "Write",
    "Edit",
    "MultiEdit",
    "Bash",
    "Grep",
    "Glob",
    "LS",
    "WebFetch",
    "WebSearch",
    "Task",
    "TodoWrite",
    "NotebookRead",
    "NotebookEdit",
    "mcp__*",
];

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_tools: DEFAULT_TOOLS.iter().map(|s| s.to_string()).collect(),
            name_matches_file: true,
            require_color: false,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: Vec::new(),
        }
    }
}

/// Config files to try, highest priority first; `./personas.yaml` comes last
fn candidate_paths(env_config: Option<PathBuf>, personas_dir: Option<PathBuf>, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    paths.extend(env_config);
    paths.extend(personas_dir.map(|d| d.join("personas.yaml")));
    paths.extend(config_dir.map(|d| d.join("personas").join("personas.yaml")));
    paths.push(PathBuf::from("personas.yaml"));
    paths
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let candidates = candidate_paths(
            std::env::var_os("PERSONAS_CONFIG").map(PathBuf::from),
            std::env::var_os("PERSONAS_DIR").map(PathBuf::from),
            dirs::config_dir(),
        );

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Failed to load config from {}: {:#}", path.display(), e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the personas home directory (config, default agents dir)
    pub fn personas_dir() -> PathBuf {
        std::env::var("PERSONAS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("personas"))
    }

    /// Resolve the directory persona documents are read from
    pub fn personas_root(&self, override_dir: Option<&Path>) -> PathBuf {
        match override_dir {
            Some(dir) => Self::expand_path(dir),
            None => Self::expand_path(&self.paths.personas),
        }
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
