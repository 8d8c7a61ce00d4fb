// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary error handling.

use thiserror::Error;

use spindle_core::error::{ConfigError, SpindleError};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client error.
    #[error(transparent)]
    Client(#[from] SpindleError),
}

/// A Result type for CLI commands.
pub type BinResult<T> = Result<T, BinError>;

/// Reports an error to stderr and exits with a failure status.
pub fn report_error_and_exit(error: BinError) -> ! {
    tracing::error!(%error, "Command failed");
    eprintln!("error: {error}");
    std::process::exit(1);
}
