// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # spindle-core
//!
//! Core abstractions and shared types for the SPINDLE MTConnect stream client.
//!
//! This crate provides the foundational types, traits, and utilities used across
//! all SPINDLE components including:
//!
//! - **Document**: Typed MTConnect documents (devices, streams, assets, errors)
//! - **Sequence**: Sample sequence range and window arithmetic
//! - **Event**: Typed client events and the subscriber dispatcher
//! - **Error**: Unified error hierarchy
//! - **Transport / Parser**: Seams for the HTTP layer and the XML layer
//! - **Cancel**: Cooperative cancellation handle
//! - **Config**: Client configuration and request URL composition
//!
//! ## Example
//!
//! ```rust,ignore
//! use spindle_core::config::ClientConfig;
//! use spindle_core::event::{ClientEvent, EventDispatcher};
//!
//! let config = ClientConfig::builder()
//!     .base_url("http://agent.example:5000")
//!     .device_name("VMC-3Axis")
//!     .build()?;
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.dispatch(&ClientEvent::Started).await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod cancel;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod parser;
pub mod sequence;
pub mod transport;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use cancel::CancelHandle;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use document::{
    AgentError, AgentHeader, Asset, AssetsDocument, ComponentStream, Device, DevicesDocument,
    DeviceStream, ErrorDocument, Observation, ObservationCategory, StreamsDocument,
    ASSET_CHANGED, UNAVAILABLE,
};
pub use error::{
    ConfigError, ConfigResult, ConnectionError, ConnectionResult, RequestFailure, RequestResult,
    SpindleError, SpindleResult,
};
pub use event::{
    ClientEvent, CollectorHandler, EventDispatcher, EventHandler, TracingHandler, TracingLevel,
};
pub use parser::{DocumentParser, ParseOutcome};
pub use sequence::{SequenceRange, RECOVERY_SLACK};
pub use transport::{AgentTransport, ChunkStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
