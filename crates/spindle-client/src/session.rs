// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The session loop state machine.
//!
//! One session drives the Probe → Current → Sample pipeline against one
//! agent and keeps it alive across connection failures, agent restarts,
//! and buffer wraparound:
//!
//! ```text
//!           ┌──────────┐  probe ok   ┌──────────────┐  window ready  ┌───────────┐
//!  start ──▶│ Probing  │────────────▶│ CurrentFetch │───────────────▶│ Streaming │
//!           └──────────┘             └──────────────┘                └───────────┘
//!                ▲   ▲                 │        ▲                      │
//!                │   │ instance change │        │ stream ended         │
//!                │   └─────────────────┘        └──────────────────────┘
//!                │                        (via Backoff on any failure)
//!                └── cancellation from any state ──▶ Stopped
//! ```
//!
//! The loop owns the sample sequence window and all session state; every
//! mutation happens on this task. Two invariants hold simultaneously:
//! `from` never regresses within one agent instance, and `from` never
//! names a sequence the agent has already discarded.
//!
//! Cancellation is authoritative: every state observes the cancel handle
//! and exits promptly, publishing `Stopped` exactly once.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;

use spindle_core::cancel::CancelHandle;
use spindle_core::config::ClientConfig;
use spindle_core::document::{AgentHeader, StreamsDocument};
use spindle_core::error::{ConnectionError, RequestFailure};
use spindle_core::event::{ClientEvent, EventDispatcher};
use spindle_core::parser::ParseOutcome;
use spindle_core::sequence::SequenceRange;

use crate::assets::AssetChangeTracker;
use crate::request::Drivers;
use crate::router::ErrorRouter;

// =============================================================================
// SessionPhase
// =============================================================================

/// The states of the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Fetching the device inventory.
    Probing,
    /// Fetching a snapshot and computing the next sample window.
    CurrentFetch,
    /// Consuming the live sample stream from the given sequence.
    Streaming {
        /// First sequence the stream was opened at.
        from: u64,
    },
    /// The session has ended.
    Stopped,
}

impl SessionPhase {
    /// Returns `true` once the session has ended.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probing => write!(f, "probing"),
            Self::CurrentFetch => write!(f, "current_fetch"),
            Self::Streaming { from } => write!(f, "streaming(from={from})"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// What a successful Current means for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentAction {
    /// The agent restarted; the device inventory must be re-probed.
    Reprobe,
    /// Open the sample stream at the given sequence.
    OpenStream { from: u64 },
}

// =============================================================================
// SessionLoop
// =============================================================================

/// The session loop. Consumed by [`run`](SessionLoop::run).
pub(crate) struct SessionLoop {
    config: Arc<ClientConfig>,
    drivers: Drivers,
    dispatcher: Arc<EventDispatcher>,
    router: ErrorRouter,
    cancel: CancelHandle,
    range: SequenceRange,
    last_instance_id: Option<u64>,
    initialize: bool,
    assets: AssetChangeTracker,
}

impl SessionLoop {
    pub(crate) fn new(
        config: Arc<ClientConfig>,
        drivers: Drivers,
        dispatcher: Arc<EventDispatcher>,
        cancel: CancelHandle,
    ) -> Self {
        let router = ErrorRouter::new(dispatcher.clone());
        Self {
            config,
            drivers,
            dispatcher,
            router,
            cancel,
            range: SequenceRange::default(),
            last_instance_id: None,
            initialize: true,
            assets: AssetChangeTracker::new(),
        }
    }

    /// Runs the session until cancelled.
    pub(crate) async fn run(mut self) {
        self.dispatcher.dispatch(&ClientEvent::Started).await;
        tracing::info!(base_url = %self.config.base_url, "Session started");

        let mut phase = SessionPhase::Probing;
        while !phase.is_stopped() {
            if self.cancel.is_cancelled() {
                break;
            }

            tracing::debug!(%phase, "Entering session phase");
            phase = match phase {
                SessionPhase::Probing => self.run_probing().await,
                SessionPhase::CurrentFetch => self.run_current_fetch().await,
                SessionPhase::Streaming { from } => self.run_streaming(from).await,
                SessionPhase::Stopped => SessionPhase::Stopped,
            };
        }

        self.dispatcher.dispatch(&ClientEvent::Stopped).await;
        tracing::info!(base_url = %self.config.base_url, "Session stopped");
    }

    // =========================================================================
    // Probing
    // =========================================================================

    async fn run_probing(&mut self) -> SessionPhase {
        match self.drivers.probe().await {
            Ok(doc) => {
                self.dispatcher
                    .dispatch(&ClientEvent::ProbeReceived(Arc::new(doc)))
                    .await;
                self.initialize = true;
                SessionPhase::CurrentFetch
            }
            Err(failure) => self.fail_into(failure, SessionPhase::Probing).await,
        }
    }

    // =========================================================================
    // CurrentFetch
    // =========================================================================

    async fn run_current_fetch(&mut self) -> SessionPhase {
        // Best-effort asset refresh ahead of the snapshot; failures are
        // published but never gate the pipeline.
        match self.drivers.assets().await {
            Ok(doc) => {
                self.dispatcher
                    .dispatch(&ClientEvent::AssetsReceived(Arc::new(doc)))
                    .await;
            }
            Err(failure) => {
                if failure.is_cancelled() {
                    return SessionPhase::Stopped;
                }
                self.router.route(failure).await;
            }
        }

        let doc = match self.drivers.current().await {
            Ok(doc) => doc,
            // The window is kept as-is so the retry recovers by replay.
            Err(failure) => return self.fail_into(failure, SessionPhase::CurrentFetch).await,
        };

        let (announce, action) = self.plan_current(&doc.header);

        if announce {
            let doc = Arc::new(doc);
            self.dispatcher
                .dispatch(&ClientEvent::CurrentReceived(doc.clone()))
                .await;
            self.refresh_changed_assets(&doc);
        }

        match action {
            CurrentAction::Reprobe => SessionPhase::Probing,
            CurrentAction::OpenStream { from } => SessionPhase::Streaming { from },
        }
    }

    /// Applies a Current header to the session state and decides what
    /// happens next. Pure state arithmetic, no I/O.
    ///
    /// Returns whether the snapshot is an (re)initialization the
    /// subscribers should see, and the resulting action.
    fn plan_current(&mut self, header: &AgentHeader) -> (bool, CurrentAction) {
        // An already-anchored window must be re-anchored when the agent's
        // buffer has advanced past it.
        if !self.initialize {
            self.initialize = self.range.from > 0 && header.first_sequence > self.range.from;
            if self.initialize {
                tracing::warn!(
                    range = %self.range,
                    first_sequence = header.first_sequence,
                    "Agent buffer advanced past the window, re-anchoring"
                );
            }
        }

        let announce = self.initialize;

        if self.initialize || self.last_instance_id != Some(header.instance_id) {
            let instance_changed = self
                .last_instance_id
                .is_some_and(|id| id != header.instance_id);

            self.range.reset();
            self.last_instance_id = Some(header.instance_id);

            if instance_changed {
                // A restarted agent may expose a different device set, so
                // the inventory is probed again before any sampling.
                tracing::info!(
                    instance_id = header.instance_id,
                    "Agent instance changed, re-probing"
                );
                self.initialize = true;
                self.assets.reset();
                return (announce, CurrentAction::Reprobe);
            }
        }

        let window = if self.initialize {
            SequenceRange::anchored_at_tail(header)
        } else {
            self.range.recovered(header, self.config.max_sample_count)
        };

        tracing::debug!(window = %window, initialize = self.initialize, "Sample window computed");
        self.range = window;
        self.initialize = false;

        (announce, CurrentAction::OpenStream { from: window.from })
    }

    // =========================================================================
    // Streaming
    // =========================================================================

    async fn run_streaming(&mut self, from: u64) -> SessionPhase {
        // The previous stream handle, if any, was dropped when the prior
        // Streaming phase returned; at most one stream is ever open.
        let mut stream = match self.drivers.open_sample_stream(from).await {
            Ok(stream) => stream,
            Err(cause) => {
                return self
                    .fail_into(cause.into(), SessionPhase::CurrentFetch)
                    .await;
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return SessionPhase::Stopped,
                next = tokio::time::timeout(self.config.timeout(), stream.next()) => next,
            };

            let cause = match next {
                Ok(Some(Ok(chunk))) => {
                    self.absorb_chunk(&chunk).await;
                    continue;
                }
                Ok(Some(Err(cause))) => cause,
                Ok(None) => ConnectionError::closed("agent ended the sample stream"),
                Err(_elapsed) => ConnectionError::timeout(self.config.timeout()),
            };

            // Stream terminated. Drop it before re-entering the pipeline.
            drop(stream);
            return self
                .fail_into(cause.into(), SessionPhase::CurrentFetch)
                .await;
        }
    }

    /// Absorbs one stream chunk: advance the window, publish the matching
    /// event, trigger asset refreshes.
    async fn absorb_chunk(&mut self, chunk: &str) {
        match self.drivers.parse_chunk(chunk) {
            ParseOutcome::Document(doc) => {
                self.range.advance(doc.observation_count());
                self.range.to = doc.header.next_sequence;

                let doc = Arc::new(doc);
                self.refresh_changed_assets(&doc);
                self.dispatcher
                    .dispatch(&ClientEvent::SampleReceived(doc))
                    .await;
            }
            ParseOutcome::AgentError(err) => {
                self.dispatcher
                    .dispatch(&ClientEvent::Error(Arc::new(err)))
                    .await;
            }
            ParseOutcome::Unrecognized => {
                self.dispatcher
                    .dispatch(&ClientEvent::XmlError {
                        payload: chunk.to_string(),
                    })
                    .await;
            }
        }
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Scans a streams document for asset changes and spawns one detached
    /// refresh per new id. Refresh tasks publish their own events and
    /// never block the session.
    fn refresh_changed_assets(&mut self, doc: &StreamsDocument) {
        let changed = self.assets.observe(doc, self.config.device_name.as_deref());

        for asset_id in changed {
            let drivers = self.drivers.clone();
            let dispatcher = self.dispatcher.clone();
            let router = self.router.clone();

            tokio::spawn(async move {
                tracing::debug!(%asset_id, "Refreshing assets after change");
                match drivers.assets().await {
                    Ok(doc) => {
                        dispatcher
                            .dispatch(&ClientEvent::AssetsReceived(Arc::new(doc)))
                            .await;
                    }
                    Err(failure) => router.route(failure).await,
                }
            });
        }
    }

    // =========================================================================
    // Failure handling
    // =========================================================================

    /// Routes a failure and backs off toward `target`.
    async fn fail_into(&mut self, failure: RequestFailure, target: SessionPhase) -> SessionPhase {
        if failure.is_cancelled() {
            return SessionPhase::Stopped;
        }

        self.router.route(failure).await;
        self.backoff(target).await
    }

    /// Waits the retry interval, or returns `Stopped` when cancelled.
    async fn backoff(&self, target: SessionPhase) -> SessionPhase {
        tracing::debug!(%target, interval_ms = self.config.retry_interval_ms, "Backing off");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => SessionPhase::Stopped,
            _ = tokio::time::sleep(self.config.retry_interval()) => target,
        }
    }
}

impl fmt::Debug for SessionLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLoop")
            .field("base_url", &self.config.base_url)
            .field("range", &self.range)
            .field("last_instance_id", &self.last_instance_id)
            .field("initialize", &self.initialize)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
