use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal report
    Terminal,
    /// Machine-readable JSON report
    Json,
    /// Markdown report
    Markdown,
}

impl From<OutputFormat> for crate::io::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => crate::io::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::OutputFormat::Json,
            OutputFormat::Markdown => crate::io::OutputFormat::Markdown,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "leadmap")]
#[command(about = "Lead scoring and persona classification engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded visitor session and report the resulting profile
    Analyze {
        /// Path to the session script (JSON)
        session: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to .leadmap.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Personalization rules file (JSON; defaults to the built-in set)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Resume from a previously saved session snapshot (JSON)
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Write the final session snapshot to this path
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },

    /// Create a default .leadmap.toml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate a rules file and the active configuration
    Validate {
        /// Path to a rules file (JSON); validates the built-in set if omitted
        rules: Option<PathBuf>,

        /// Configuration file (defaults to .leadmap.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
