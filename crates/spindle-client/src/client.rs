// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The public client handle.
//!
//! [`SpindleClient`] wires the configuration, transport, parser, and
//! event dispatcher into a session loop and owns its lifecycle. The
//! client is created inert: `start` launches the session task, `stop`
//! requests cooperative cancellation and returns immediately, `join`
//! awaits the task's completion.
//!
//! Handlers may be subscribed before or after `start`; delivery begins
//! with the next matching event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use spindle_core::cancel::CancelHandle;
use spindle_core::config::ClientConfig;
use spindle_core::error::{ConfigError, SpindleError, SpindleResult};
use spindle_core::event::{EventDispatcher, EventHandler};
use spindle_core::parser::DocumentParser;
use spindle_core::transport::AgentTransport;

use crate::request::Drivers;
use crate::session::SessionLoop;

// =============================================================================
// SpindleClient
// =============================================================================

/// A client for one MTConnect agent.
///
/// One client serves one base URL with one optional device filter. The
/// lifecycle is one-shot: once stopped, a new client is created for a
/// new session.
pub struct SpindleClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn AgentTransport>,
    parser: Arc<dyn DocumentParser>,
    dispatcher: Arc<EventDispatcher>,
    cancel: CancelHandle,
    started: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SpindleClient {
    /// Creates an inert client. Validates the configuration.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn AgentTransport>,
        parser: Arc<dyn DocumentParser>,
    ) -> SpindleResult<Self> {
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            transport,
            parser,
            dispatcher: Arc::new(EventDispatcher::new()),
            cancel: CancelHandle::new(),
            started: AtomicBool::new(false),
            task: Mutex::new(None),
        })
    }

    /// Returns a builder.
    pub fn builder() -> SpindleClientBuilder {
        SpindleClientBuilder::default()
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Subscribes an event handler. Delivery begins with the next event.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        self.dispatcher.register(handler);
    }

    /// Returns the event dispatcher.
    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        self.dispatcher.clone()
    }

    /// Launches the session loop.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a lifecycle error if the client was already started.
    pub fn start(&self) -> SpindleResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SpindleError::lifecycle("client already started"));
        }

        let drivers = Drivers::new(
            self.config.clone(),
            self.transport.clone(),
            self.parser.clone(),
            self.cancel.clone(),
        );
        let session = SessionLoop::new(
            self.config.clone(),
            drivers,
            self.dispatcher.clone(),
            self.cancel.clone(),
        );

        *self.task.lock() = Some(tokio::spawn(session.run()));
        Ok(())
    }

    /// Requests cooperative cancellation and returns immediately.
    ///
    /// The active sample stream is closed as the session task observes
    /// the cancellation; no new requests are initiated afterwards. Safe
    /// to call from inside an event handler.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Awaits the session task's completion.
    ///
    /// Returns immediately when the client was never started.
    pub async fn join(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Returns `true` while the session task is running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for SpindleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpindleClient")
            .field("base_url", &self.config.base_url)
            .field("started", &self.started.load(Ordering::SeqCst))
            .field("running", &self.is_running())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`SpindleClient`].
#[derive(Default)]
pub struct SpindleClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn AgentTransport>>,
    parser: Option<Arc<dyn DocumentParser>>,
}

impl SpindleClientBuilder {
    /// Sets the configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: Arc<dyn AgentTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the document parser.
    pub fn parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Builds the client.
    pub fn build(self) -> SpindleResult<SpindleClient> {
        let config = self
            .config
            .ok_or_else(|| ConfigError::missing_field("config"))?;
        let transport = self
            .transport
            .ok_or_else(|| ConfigError::missing_field("transport"))?;
        let parser = self
            .parser
            .ok_or_else(|| ConfigError::missing_field("parser"))?;

        SpindleClient::new(config, transport, parser)
    }
}

impl std::fmt::Debug for SpindleClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpindleClientBuilder")
            .field("has_config", &self.config.is_some())
            .field("has_transport", &self.transport.is_some())
            .field("has_parser", &self.parser.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
