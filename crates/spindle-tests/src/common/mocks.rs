// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scripted agent transport.
//!
//! [`ScriptedTransport`] answers the client's requests from per-endpoint
//! queues and records every URL it is asked for. An endpoint whose queue
//! runs dry falls back to its default response when one is set, and
//! otherwise parks the request forever, which freezes the pipeline in a
//! deterministic spot until the test stops the client.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

use spindle_core::error::{ConnectionError, ConnectionResult};
use spindle_core::transport::{AgentTransport, ChunkStream};

// =============================================================================
// Scripted responses
// =============================================================================

/// How a scripted sample stream behaves after its items are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The agent closes the connection.
    Close,
    /// The stream stays open without further chunks.
    Hold,
}

/// One scripted sample stream.
pub struct ScriptedStream {
    items: Vec<ConnectionResult<String>>,
    end: StreamEnd,
}

#[derive(Default)]
struct Endpoint {
    queue: VecDeque<ConnectionResult<String>>,
    default: Option<String>,
}

impl Endpoint {
    fn answer(&mut self) -> Option<ConnectionResult<String>> {
        match self.queue.pop_front() {
            Some(response) => Some(response),
            None => self.default.clone().map(Ok),
        }
    }
}

// =============================================================================
// ScriptedTransport
// =============================================================================

/// An in-memory agent with scripted behavior.
#[derive(Default)]
pub struct ScriptedTransport {
    probe: Mutex<Endpoint>,
    current: Mutex<Endpoint>,
    assets: Mutex<Endpoint>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Creates an empty script.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues one probe response.
    pub fn push_probe(&self, response: ConnectionResult<String>) {
        self.probe.lock().queue.push_back(response);
    }

    /// Queues one current response.
    pub fn push_current(&self, response: ConnectionResult<String>) {
        self.current.lock().queue.push_back(response);
    }

    /// Queues one assets response.
    pub fn push_assets(&self, response: ConnectionResult<String>) {
        self.assets.lock().queue.push_back(response);
    }

    /// Sets the assets response served whenever the queue is empty.
    pub fn default_assets(&self, body: &str) {
        self.assets.lock().default = Some(body.to_string());
    }

    /// Sets the probe response served whenever the queue is empty.
    pub fn default_probe(&self, body: &str) {
        self.probe.lock().default = Some(body.to_string());
    }

    /// Queues one sample stream.
    pub fn push_stream(&self, items: Vec<ConnectionResult<String>>, end: StreamEnd) {
        self.streams
            .lock()
            .push_back(ScriptedStream { items, end });
    }

    /// Returns every requested URL, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Counts requests whose URL contains `needle`.
    pub fn requests_containing(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|u| u.contains(needle))
            .count()
    }

    fn record(&self, url: &str) {
        self.requests.lock().push(url.to_string());
    }

    async fn park() -> ConnectionResult<String> {
        futures::future::pending().await
    }
}

#[async_trait]
impl AgentTransport for ScriptedTransport {
    async fn fetch(&self, url: &str) -> ConnectionResult<String> {
        self.record(url);

        let answer = if url.contains("/probe") {
            self.probe.lock().answer()
        } else if url.contains("/current") {
            self.current.lock().answer()
        } else if url.contains("/assets") {
            self.assets.lock().answer()
        } else {
            Some(Err(ConnectionError::io(format!("unexpected URL: {url}"))))
        };

        match answer {
            Some(response) => response,
            None => Self::park().await,
        }
    }

    async fn open_stream(&self, url: &str) -> ConnectionResult<ChunkStream> {
        self.record(url);

        let Some(scripted) = self.streams.lock().pop_front() else {
            Self::park().await?;
            unreachable!("parked request never resolves");
        };

        let items = stream::iter(scripted.items);
        let chunks: ChunkStream = match scripted.end {
            StreamEnd::Close => Box::pin(items),
            StreamEnd::Hold => Box::pin(items.chain(stream::pending())),
        };

        Ok(chunks)
    }
}
