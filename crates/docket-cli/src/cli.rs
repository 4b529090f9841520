//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docket CLI - Classify, extract and score batches of documents.
#[derive(Debug, Parser)]
#[command(name = "docket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.docket/config.toml)
    #[arg(short, long, global = true, env = "DOCKET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per file)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process every document in a folder
    Run(RunArgs),

    /// Classify, extract and score a single document of a known type
    Extract(ExtractArgs),

    /// Manage prompt template directories
    Prompts(PromptsArgs),

    /// Show what the truncation scanner makes of a response file
    Scan(ScanArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Folder holding the documents (a container is a subfolder of it)
    #[arg(short, long)]
    pub source: PathBuf,

    /// Subfolder of the source to process
    #[arg(long, default_value = ".")]
    pub container: String,

    /// Requested document type, or `any`
    #[arg(short, long, default_value = "any")]
    pub doc_type: String,

    /// Prompt template directory (overrides the config file)
    #[arg(short, long)]
    pub prompts: Option<PathBuf>,

    /// Use a built-in configuration preset instead of the file's settings
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Download gate size
    #[arg(long)]
    pub download_concurrency: Option<usize>,

    /// Processing gate size
    #[arg(long)]
    pub processing_concurrency: Option<usize>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to process
    pub file: PathBuf,

    /// Type the document must be classified as
    #[arg(short, long)]
    pub doc_type: String,

    /// Prompt template directory (overrides the config file)
    #[arg(short, long)]
    pub prompts: Option<PathBuf>,
}

/// Orchestrator presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Small gates, patient retries
    Conservative,
    /// Default settings
    Default,
    /// Wide gates, quick failure
    HighThroughput,
}

/// Arguments for prompt management.
#[derive(Debug, Parser)]
pub struct PromptsArgs {
    #[command(subcommand)]
    pub action: PromptsAction,
}

/// Prompt management actions.
#[derive(Debug, Subcommand)]
pub enum PromptsAction {
    /// Write the default templates into a directory
    Init {
        /// Target directory
        dir: PathBuf,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Check that a directory has every template the registry needs
    Check {
        /// Template directory
        dir: PathBuf,
    },
}

/// Arguments for the scan command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// File holding a (possibly truncated) model response
    pub file: PathBuf,

    /// Document type, to also show where recovery would resume
    #[arg(short, long)]
    pub doc_type: Option<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<PresetArg> for docket_orchestrator::OrchestratorConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Conservative => Self::conservative(),
            PresetArg::Default => Self::default(),
            PresetArg::HighThroughput => Self::high_throughput(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from([
            "docket",
            "run",
            "--source",
            "/data/inbox",
            "--doc-type",
            "BankStatement",
            "--download-concurrency",
            "10",
        ]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.source, PathBuf::from("/data/inbox"));
                assert_eq!(args.container, ".");
                assert_eq!(args.doc_type, "BankStatement");
                assert_eq!(args.download_concurrency, Some(10));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from(["docket", "extract", "invoice.pdf", "-d", "Invoice"]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.file, PathBuf::from("invoice.pdf"));
                assert_eq!(args.doc_type, "Invoice");
                assert!(args.prompts.is_none());
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["docket", "config", "show", "--format", "json", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs { action: ConfigAction::Show })
        ));
    }

    #[test]
    fn test_preset_conversion() {
        let config: docket_orchestrator::OrchestratorConfig = PresetArg::Conservative.into();
        assert_eq!(config.download_concurrency, 8);
    }
}
