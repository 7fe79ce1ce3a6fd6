//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OpenAPI recorder CLI
#[derive(Parser, Debug)]
#[command(name = "oas-recorder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Recorder configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a HAR file and write the OpenAPI document
    Build {
        /// HAR file exported from browser devtools
        #[arg(long)]
        har: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Re-template an endpoint before writing: HOST INDEX TEMPLATE
        /// (repeatable, applied in order)
        #[arg(
            long,
            num_args = 3,
            value_names = ["HOST", "INDEX", "TEMPLATE"],
            action = clap::ArgAction::Append
        )]
        parameterise: Vec<String>,
    },

    /// List clustered endpoints per host
    Endpoints {
        /// HAR file exported from browser devtools
        #[arg(long)]
        har: PathBuf,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
