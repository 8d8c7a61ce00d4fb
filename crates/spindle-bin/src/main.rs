// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! SPINDLE - Streaming client for MTConnect agents
//!
//! Main binary entry point.

use clap::Parser;

use spindle_bin::cli::Cli;
use spindle_bin::commands;
use spindle_bin::error::report_error_and_exit;
use spindle_bin::logging::init_logging;

/// Application entry point.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format);

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}
