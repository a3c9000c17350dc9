//! # CLI Module
//!
//! Command definitions and handlers for the `brotli-guard` binary.
//!
//! Handlers take the probe and an output writer instead of reaching for the
//! global probe and stdout, so tests can drive them with any outcome.

use brotli_guard_core::{CapabilityError, CapabilityProbe};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Check whether Brotli compression support is usable in this build.
#[derive(Debug, Parser)]
#[command(name = "brotli-guard", version, about)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Print the probe report.
    Status {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Exit non-zero unless Brotli support is available.
    Ensure,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Unavailable(#[from] CapabilityError),
}

impl CliError {
    /// Process exit code: 1 for an unavailable capability, 2 for anything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Unavailable(_) => 1,
            CliError::Io(_) | CliError::Json(_) => 2,
        }
    }
}

// =============================================================================
// LOGGING
// =============================================================================

/// Install the stderr subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Dispatch a parsed command.
pub fn run<W: Write>(
    command: &Commands,
    probe: &CapabilityProbe,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        Commands::Status { json } => cmd_status(probe, *json, out),
        Commands::Ensure => cmd_ensure(probe, out),
    }
}

/// Print the probe report. Succeeds whatever the probe outcome.
pub fn cmd_status<W: Write>(
    probe: &CapabilityProbe,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let report = probe.report();
    tracing::debug!(status = %report.status, "status requested");

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        out.write_all(report.to_text().as_bytes())?;
    }
    Ok(())
}

/// Succeed only if the capability is available.
pub fn cmd_ensure<W: Write>(probe: &CapabilityProbe, out: &mut W) -> Result<(), CliError> {
    probe.ensure_available()?;
    writeln!(out, "{} available", probe.capability().feature)?;
    Ok(())
}
