// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # spindle-client
//!
//! The session machinery of the SPINDLE MTConnect stream client.
//!
//! This crate drives the Probe → Current → Sample pipeline against one
//! agent:
//!
//! - **Request**: stateless one-shot request drivers over the transport
//!   and parser seams
//! - **Router**: demultiplexes the three failure domains onto the right
//!   subscriber channels
//! - **Assets**: watches `AssetChanged` observations and refreshes asset
//!   documents on demand
//! - **Session**: the state machine owning the sample sequence window,
//!   agent instance tracking, and retry scheduling
//! - **Client**: the public handle wiring everything together
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spindle_client::SpindleClient;
//! use spindle_core::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .base_url("http://agent.example:5000")
//!     .build()?;
//!
//! let client = SpindleClient::new(config, transport, parser)?;
//! client.subscribe(Arc::new(my_handler));
//! client.start()?;
//! // ...
//! client.stop();
//! client.join().await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod assets;
pub mod client;
pub mod request;
pub mod router;
pub mod session;

pub use assets::AssetChangeTracker;
pub use client::{SpindleClient, SpindleClientBuilder};
pub use request::Drivers;
pub use router::ErrorRouter;
pub use session::SessionPhase;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
