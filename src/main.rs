//! Staticgate - a static file server with traversal-safe path resolution.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod fileserver;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{ServerConfig, init_config};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(ServerConfig::load(cli)?);

    match &cli.command {
        Commands::Serve { .. } => {
            cli::serve::bind_server()?.run()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve {
            path, method, host, ..
        } => {
            let served = cli::resolve::run_resolve(&config, path, method, host.as_deref())?;
            Ok(if served {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
