// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # spindle-http
//!
//! HTTP transport for the SPINDLE MTConnect client.
//!
//! Implements the `AgentTransport` seam with `reqwest`:
//!
//! - **Transport**: one-shot GETs with a request timeout, and streaming
//!   GETs with connect and read-idle timeouts
//! - **Multipart**: incremental decoding of the agent's
//!   `multipart/x-mixed-replace` sample stream into XML payloads

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod multipart;
pub mod transport;

pub use multipart::{boundary_from_content_type, BoundaryDecoder};
pub use transport::HttpTransport;
