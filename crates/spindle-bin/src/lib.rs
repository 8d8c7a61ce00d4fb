// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # spindle-bin
//!
//! Command line interface for the SPINDLE MTConnect stream client.
//!
//! Wires the HTTP transport and XML parser into the client, streams
//! agent telemetry to the log, and shuts down cleanly on SIGINT/SIGTERM.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
