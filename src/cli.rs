use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "personas",
    about = "Load, validate, index and render persona documents for LLM agent runtimes",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/personas/logs/personas.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to personas.yaml config file")]
    pub config: Option<PathBuf>,

    /// Personas directory (overrides paths.personas from config)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List persona documents
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,

        /// Only personas that declare this tool
        #[arg(long)]
        tool: Option<String>,
    },

    /// Show one persona's header and metadata
    Show {
        /// Persona name
        name: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the text injected into a prompt for a persona
    Prompt {
        /// Persona name
        name: String,

        /// Prefix the prompt with the persona's name and description
        #[arg(long)]
        with_header: bool,
    },

    /// Validate persona documents
    Validate {
        /// Files or directories to validate (defaults to the personas directory)
        paths: Vec<PathBuf>,

        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Generate a routing index for an external router
    Index {
        /// Write the index to this file (.json for JSON, otherwise YAML)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print a Markdown table instead of the structured index
        #[arg(long)]
        snippet: bool,

        /// Output format when printing to stdout (default: yaml)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show which tools personas declare
    Tools {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Create a new persona document from a template
    New {
        /// Persona name (kebab-case)
        name: String,

        /// One-line description
        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tool list
        #[arg(long, value_delimiter = ',')]
        tools: Vec<String>,

        /// Display color (hex, e.g. "#3b82f6")
        #[arg(long)]
        color: Option<String>,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },
}
