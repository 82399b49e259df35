//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Static file server with traversal-safe path resolution
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: staticgate.toml)
    #[arg(short = 'C', long, global = true, default_value = "staticgate.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Shared file options of the active command.
    pub const fn files_args(&self) -> &FilesArgs {
        match &self.command {
            Commands::Serve { files, .. } | Commands::Resolve { files, .. } => files,
        }
    }

    pub const fn is_verbose(&self) -> bool {
        match &self.command {
            Commands::Serve { verbose, .. } | Commands::Resolve { verbose, .. } => *verbose,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve files from the root directory
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        files: FilesArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Number of request worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Reload the config file when it changes
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Resolve one request path and print the outcome
    #[command(visible_alias = "r")]
    Resolve {
        /// URL path to resolve (e.g., /docs/)
        #[arg(value_name = "PATH")]
        path: String,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Value of the Host header, for host placeholders
        #[arg(long)]
        host: Option<String>,

        #[command(flatten)]
        files: FilesArgs,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },
}

/// File options shared by Serve and Resolve commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilesArgs {
    /// Site root directory (may contain placeholders)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<String>,

    /// Extra hide pattern, added to those in the config file (repeatable)
    #[arg(long = "hide", value_name = "PATTERN")]
    pub hide: Vec<String>,

    /// Index file name, replacing the configured list (repeatable)
    #[arg(long = "index", value_name = "NAME")]
    pub index: Vec<String>,
}
