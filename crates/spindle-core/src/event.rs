// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client events and the subscriber dispatcher.
//!
//! This module provides the typed fan-out surface of the client. Every
//! document the session loop receives, and every failure it absorbs, is
//! published as a [`ClientEvent`] to the registered [`EventHandler`]s.
//!
//! # Design Principles
//!
//! - **Non-blocking**: handlers run on the task that produced the event
//!   and must not block; long work is the handler's job to offload
//! - **Composable**: any number of handlers can be registered
//! - **Type-safe**: one enum variant per event kind, no stringly typing
//!
//! Document payloads are shared via `Arc` so dispatching to many handlers
//! never copies a parsed document.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::document::{AssetsDocument, DevicesDocument, ErrorDocument, StreamsDocument};

// =============================================================================
// ClientEvent
// =============================================================================

/// Events published by the client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The session loop started.
    Started,

    /// A probe returned a device inventory.
    ProbeReceived(Arc<DevicesDocument>),

    /// A current request returned an observation snapshot.
    CurrentReceived(Arc<StreamsDocument>),

    /// A sample stream chunk was received.
    SampleReceived(Arc<StreamsDocument>),

    /// An assets request returned asset documents.
    AssetsReceived(Arc<AssetsDocument>),

    /// The agent answered with an MTConnectError document.
    Error(Arc<ErrorDocument>),

    /// A request failed in the connection domain.
    ConnectionError {
        /// Failure description.
        message: String,
    },

    /// A response body parsed as none of the expected document shapes.
    XmlError {
        /// The raw payload that failed to parse.
        payload: String,
    },

    /// The session loop stopped. Published exactly once per session.
    Stopped,
}

impl ClientEvent {
    /// Returns the event kind as a string for logging and filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::Started => "started",
            ClientEvent::ProbeReceived(_) => "probe_received",
            ClientEvent::CurrentReceived(_) => "current_received",
            ClientEvent::SampleReceived(_) => "sample_received",
            ClientEvent::AssetsReceived(_) => "assets_received",
            ClientEvent::Error(_) => "error",
            ClientEvent::ConnectionError { .. } => "connection_error",
            ClientEvent::XmlError { .. } => "xml_error",
            ClientEvent::Stopped => "stopped",
        }
    }
}

// =============================================================================
// EventHandler Trait
// =============================================================================

/// A subscriber for client events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the handler name for logging and unregistration.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Handles one event.
    ///
    /// Runs on the task that produced the event; must not block. Calling
    /// the client's `stop` from inside a handler is allowed, it only
    /// signals cancellation and returns.
    async fn handle(&self, event: &ClientEvent);
}

// =============================================================================
// EventDispatcher
// =============================================================================

/// Dispatches events to registered handlers, in registration order.
pub struct EventDispatcher {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Creates a new dispatcher with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Registers a handler. Delivery begins with the next event.
    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().push(handler);
    }

    /// Removes all handlers with the given name.
    pub fn unregister(&self, name: &str) {
        self.handlers.write().retain(|h| h.name() != name);
    }

    /// Delivers an event to every handler.
    pub async fn dispatch(&self, event: &ClientEvent) {
        let handlers = self.handlers.read().clone();

        for handler in handlers {
            handler.handle(event).await;
        }
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read();
        let names: Vec<_> = handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("EventDispatcher")
            .field("handlers", &names)
            .finish()
    }
}

// =============================================================================
// TracingHandler
// =============================================================================

/// Log level selection for [`TracingHandler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    #[default]
    Debug,
    /// Info level.
    Info,
}

/// A handler that logs every event via `tracing`.
///
/// Failure events always log at warn; document events log at the
/// configured level.
#[derive(Debug, Default)]
pub struct TracingHandler {
    level: TracingLevel,
}

impl TracingHandler {
    /// Creates a handler logging document events at debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level used for document events.
    pub fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }
}

#[async_trait]
impl EventHandler for TracingHandler {
    fn name(&self) -> &str {
        "tracing_handler"
    }

    async fn handle(&self, event: &ClientEvent) {
        let kind = event.kind();

        match event {
            ClientEvent::Error(doc) => {
                tracing::warn!(event = kind, summary = %doc.summary(), "Agent reported an error")
            }
            ClientEvent::ConnectionError { message } => {
                tracing::warn!(event = kind, cause = %message, "Connection failure")
            }
            ClientEvent::XmlError { payload } => {
                tracing::warn!(event = kind, bytes = payload.len(), "Unparseable response body")
            }
            ClientEvent::Started | ClientEvent::Stopped => {
                tracing::info!(event = kind, "Session lifecycle")
            }
            _ => match self.level {
                TracingLevel::Trace => tracing::trace!(event = kind, "Document received"),
                TracingLevel::Debug => tracing::debug!(event = kind, "Document received"),
                TracingLevel::Info => tracing::info!(event = kind, "Document received"),
            },
        }
    }
}

// =============================================================================
// CollectorHandler
// =============================================================================

/// A handler that collects events in memory. Useful for tests.
#[derive(Debug)]
pub struct CollectorHandler {
    events: RwLock<Vec<ClientEvent>>,
    max_events: usize,
}

impl CollectorHandler {
    /// Creates a collector retaining up to `max_events` events.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Returns the collected events.
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns `true` if no events were collected.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Counts collected events of the given kind.
    pub fn count_of(&self, kind: &str) -> usize {
        self.events.read().iter().filter(|e| e.kind() == kind).count()
    }

    /// Clears the collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventHandler for CollectorHandler {
    fn name(&self) -> &str {
        "collector_handler"
    }

    async fn handle(&self, event: &ClientEvent) {
        let mut events = self.events.write();
        if events.len() >= self.max_events {
            events.remove(0);
        }
        events.push(event.clone());
    }
}

// =============================================================================
// Tests
// =============================================================================
