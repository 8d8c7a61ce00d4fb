// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! One-shot request drivers.
//!
//! Each driver performs a single GET against the agent, hands the body to
//! the parser, and classifies the outcome into the three failure domains:
//! connection failure, agent-reported error document, or unrecognized
//! body. Drivers are stateless; the session loop decides what a failure
//! means.
//!
//! All drivers honor cancellation by returning
//! [`ConnectionError::Cancelled`] without waiting for the in-flight
//! request.

use std::sync::Arc;

use spindle_core::cancel::CancelHandle;
use spindle_core::config::ClientConfig;
use spindle_core::document::{AssetsDocument, DevicesDocument, StreamsDocument};
use spindle_core::error::{ConnectionError, ConnectionResult, RequestFailure, RequestResult};
use spindle_core::parser::{DocumentParser, ParseOutcome};
use spindle_core::transport::{AgentTransport, ChunkStream};

// =============================================================================
// Drivers
// =============================================================================

/// The four request executors of the MTConnect REST surface.
///
/// Cheap to clone; detached asset refresh tasks take their own copy.
#[derive(Clone)]
pub struct Drivers {
    config: Arc<ClientConfig>,
    transport: Arc<dyn AgentTransport>,
    parser: Arc<dyn DocumentParser>,
    cancel: CancelHandle,
}

impl Drivers {
    /// Creates drivers over the given seams.
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn AgentTransport>,
        parser: Arc<dyn DocumentParser>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            config,
            transport,
            parser,
            cancel,
        }
    }

    /// Executes a probe request.
    pub async fn probe(&self) -> RequestResult<DevicesDocument> {
        let url = self.config.probe_url();
        let body = self.fetch(&url).await?;
        classify(self.parser.parse_devices(&body), body)
    }

    /// Executes a current request.
    pub async fn current(&self) -> RequestResult<StreamsDocument> {
        let url = self.config.current_url();
        let body = self.fetch(&url).await?;
        classify(self.parser.parse_streams(&body), body)
    }

    /// Executes an assets request.
    pub async fn assets(&self) -> RequestResult<AssetsDocument> {
        let url = self.config.assets_url();
        let body = self.fetch(&url).await?;
        classify(self.parser.parse_assets(&body), body)
    }

    /// Opens the sample stream starting at `from`.
    pub async fn open_sample_stream(&self, from: u64) -> ConnectionResult<ChunkStream> {
        if self.cancel.is_cancelled() {
            return Err(ConnectionError::Cancelled);
        }

        let url = self.config.sample_url(from);
        tracing::debug!(%url, "Opening sample stream");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ConnectionError::Cancelled),
            result = self.transport.open_stream(&url) => result,
        }
    }

    /// Parses a sample stream chunk.
    pub fn parse_chunk(&self, chunk: &str) -> ParseOutcome<StreamsDocument> {
        self.parser.parse_streams(chunk)
    }

    async fn fetch(&self, url: &str) -> RequestResult<String> {
        if self.cancel.is_cancelled() {
            return Err(ConnectionError::Cancelled.into());
        }

        tracing::trace!(%url, "Executing request");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ConnectionError::Cancelled.into()),
            result = self.transport.fetch(url) => result.map_err(RequestFailure::from),
        }
    }
}

impl std::fmt::Debug for Drivers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drivers")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Maps a parse outcome onto the request failure domains.
fn classify<T>(outcome: ParseOutcome<T>, body: String) -> RequestResult<T> {
    match outcome {
        ParseOutcome::Document(doc) => Ok(doc),
        ParseOutcome::AgentError(err) => Err(RequestFailure::agent_error(err)),
        ParseOutcome::Unrecognized => Err(RequestFailure::unrecognized(body)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use spindle_core::document::ErrorDocument;

    /// Transport answering every fetch with the same canned body.
    struct CannedTransport {
        body: String,
        requests: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AgentTransport for CannedTransport {
        async fn fetch(&self, url: &str) -> ConnectionResult<String> {
            self.requests.lock().push(url.to_string());
            Ok(self.body.clone())
        }

        async fn open_stream(&self, url: &str) -> ConnectionResult<ChunkStream> {
            self.requests.lock().push(url.to_string());
            let chunks: ChunkStream = Box::pin(futures::stream::empty());
            Ok(chunks)
        }
    }

    /// Parser with scripted outcomes.
    struct FixedParser {
        outcome: ParseOutcome<()>,
    }

    impl DocumentParser for FixedParser {
        fn parse_devices(&self, _body: &str) -> ParseOutcome<DevicesDocument> {
            self.outcome.clone().map(|_| DevicesDocument::default())
        }

        fn parse_streams(&self, _body: &str) -> ParseOutcome<StreamsDocument> {
            self.outcome.clone().map(|_| StreamsDocument::default())
        }

        fn parse_assets(&self, _body: &str) -> ParseOutcome<AssetsDocument> {
            self.outcome.clone().map(|_| AssetsDocument::default())
        }
    }

    fn drivers(outcome: ParseOutcome<()>) -> (Drivers, Arc<CannedTransport>, CancelHandle) {
        let transport = Arc::new(CannedTransport::new("<xml/>"));
        let cancel = CancelHandle::new();
        let drivers = Drivers::new(
            Arc::new(ClientConfig::new("http://agent.example:5000")),
            transport.clone(),
            Arc::new(FixedParser { outcome }),
            cancel.clone(),
        );
        (drivers, transport, cancel)
    }

    #[tokio::test]
    async fn test_probe_hits_probe_url() {
        let (drivers, transport, _cancel) = drivers(ParseOutcome::Document(()));

        drivers.probe().await.unwrap();

        let requests = transport.requests.lock();
        assert_eq!(requests.as_slice(), ["http://agent.example:5000/probe"]);
    }

    #[tokio::test]
    async fn test_agent_error_classified() {
        let (drivers, _transport, _cancel) =
            drivers(ParseOutcome::AgentError(ErrorDocument::default()));

        let failure = drivers.current().await.unwrap_err();
        assert_eq!(failure.domain(), "agent_error");
    }

    #[tokio::test]
    async fn test_unrecognized_body_carries_payload() {
        let (drivers, _transport, _cancel) = drivers(ParseOutcome::Unrecognized);

        match drivers.assets().await.unwrap_err() {
            RequestFailure::Unrecognized { payload } => assert_eq!(payload, "<xml/>"),
            other => panic!("Expected Unrecognized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let (drivers, transport, cancel) = drivers(ParseOutcome::Document(()));
        cancel.cancel();

        let failure = drivers.probe().await.unwrap_err();
        assert!(failure.is_cancelled());
        assert!(transport.requests.lock().is_empty());

        let stream = drivers.open_sample_stream(0).await;
        assert!(matches!(stream, Err(ConnectionError::Cancelled)));
    }

    #[tokio::test]
    async fn test_sample_stream_url() {
        let (drivers, transport, _cancel) = drivers(ParseOutcome::Document(()));

        drivers.open_sample_stream(1000).await.unwrap();

        let requests = transport.requests.lock();
        assert_eq!(
            requests.as_slice(),
            ["http://agent.example:5000/sample?from=1000&count=200&interval=500"]
        );
    }
}
