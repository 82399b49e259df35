//! Server configuration management for `staticgate.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── files      # [files]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! ├── watch.rs       # Reload on file change
//! └── mod.rs         # ServerConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section   | Purpose                                        |
//! |-----------|------------------------------------------------|
//! | `[files]` | Root, hide patterns, index names, 404 page     |
//! | `[serve]` | HTTP server (interface, port, workers, watch)  |
//!
//! Relative paths are relative to the working directory. The config file
//! is optional; without one every setting has its default.

pub mod section;
pub mod types;
pub mod watch;

pub use section::{FilesConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use crate::{
    cli::{Cli, Commands, FilesArgs},
    debug, log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "staticgate.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing staticgate.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Static file settings
    #[serde(default)]
    pub files: FilesConfig,
}

impl ServerConfig {
    const ROOT: FieldPath = FieldPath::new("files.root");

    /// Load configuration from CLI arguments.
    ///
    /// A missing default config file is not an error; a missing file given
    /// with `--config` is.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = cwd.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else if cli.config != Path::new(DEFAULT_CONFIG) {
            bail!(ConfigError::Validation(format!(
                "config file '{}' not found",
                cli.config.display()
            )));
        } else {
            debug!("config"; "no {}, using defaults", DEFAULT_CONFIG);
            Self::default()
        };

        config.config_path = config_path;
        config.cli = Some(cli);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.is_verbose());
        self.apply_files_args(cli.files_args());

        match &cli.command {
            Commands::Serve {
                interface,
                port,
                workers,
                watch,
                ..
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.workers, workers.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            // Resolve only reads [files]
            Commands::Resolve { .. } => {}
        }
    }

    /// Apply file arguments from CLI.
    ///
    /// `--hide` adds to the configured patterns; `--index` replaces the
    /// configured names.
    fn apply_files_args(&mut self, args: &FilesArgs) {
        Self::update_option(&mut self.files.root, args.root.as_ref());
        self.files.hide.extend(args.hide.iter().cloned());
        if !args.index.is_empty() {
            self.files.index_names.clone_from(&args.index);
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.serve.validate(&mut diag);
        self.files.validate(&mut diag);

        // A root with placeholders is only known per request
        let root = &self.files.root;
        if !root.contains('{') && !root.is_empty() && !Path::new(root).is_dir() {
            diag.warn(Self::ROOT, format!("`{root}` is not a directory"));
        }

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ServerConfig {
    let (parsed, ignored) = ServerConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
