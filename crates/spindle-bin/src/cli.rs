// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! Subcommands:
//!
//! - `run`: stream telemetry from an agent until interrupted (default)
//! - `probe`: one-shot device inventory listing
//! - `version`: show version information

use clap::{Args, Parser, Subcommand, ValueEnum};

use spindle_core::config::{
    ClientConfig, DEFAULT_INTERVAL_MS, DEFAULT_MAX_SAMPLE_COUNT, DEFAULT_RETRY_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};
use spindle_core::error::ConfigResult;

// =============================================================================
// Main CLI Structure
// =============================================================================

/// SPINDLE - Streaming client for MTConnect agents
#[derive(Parser, Debug)]
#[command(
    name = "spindle",
    author = "Sylvex <contact@sylvex.io>",
    version,
    about = "Streaming client for MTConnect manufacturing telemetry agents",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "SPINDLE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "SPINDLE_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Stream telemetry from an agent until interrupted
    Run(AgentArgs),

    /// Fetch and print the agent's device inventory
    Probe(AgentArgs),

    /// Show version information
    Version,
}

/// Agent connection arguments shared by the run and probe commands.
#[derive(Args, Debug, Clone)]
pub struct AgentArgs {
    /// Agent base URL, e.g. http://agent.example:5000
    #[arg(short, long, env = "SPINDLE_BASE_URL")]
    pub base_url: String,

    /// Restrict requests to one device by name
    #[arg(short, long, env = "SPINDLE_DEVICE")]
    pub device: Option<String>,

    /// Sample stream interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Retry backoff in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_INTERVAL_MS)]
    pub retry_interval_ms: u64,

    /// Maximum samples per request window
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLE_COUNT)]
    pub max_sample_count: u64,
}

impl AgentArgs {
    /// Builds and validates a client configuration from the arguments.
    pub fn to_config(&self) -> ConfigResult<ClientConfig> {
        let mut builder = ClientConfig::builder()
            .base_url(&self.base_url)
            .interval_ms(self.interval_ms)
            .timeout_ms(self.timeout_ms)
            .retry_interval_ms(self.retry_interval_ms)
            .max_sample_count(self.max_sample_count);

        if let Some(device) = &self.device {
            builder = builder.device_name(device);
        }

        builder.build()
    }
}

// =============================================================================
// Log Format
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
    /// Minimal compact output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_parses() {
        let cli = Cli::parse_from([
            "spindle",
            "run",
            "--base-url",
            "http://agent.example:5000",
            "--device",
            "VMC-3Axis",
            "--interval-ms",
            "250",
        ]);

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.base_url, "http://agent.example:5000");
                assert_eq!(args.device.as_deref(), Some("VMC-3Axis"));
                assert_eq!(args.interval_ms, 250);
                assert_eq!(args.max_sample_count, DEFAULT_MAX_SAMPLE_COUNT);
            }
            other => panic!("Expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_args_to_config() {
        let cli = Cli::parse_from(["spindle", "probe", "--base-url", "http://agent:5000"]);

        let Commands::Probe(args) = cli.command else {
            panic!("Expected Probe");
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.base_url, "http://agent:5000");
        assert!(config.device_name.is_none());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let cli = Cli::parse_from(["spindle", "run", "--base-url", "agent:5000"]);

        let Commands::Run(args) = cli.command else {
            panic!("Expected Run");
        };
        assert!(args.to_config().is_err());
    }
}
