// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `reqwest` implementation of the agent transport.
//!
//! One-shot requests carry a total request timeout. Streaming requests
//! carry the timeout on connection establishment and then on every read;
//! the long-poll itself is unbounded, the agent paces it with its
//! configured interval.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use spindle_core::error::{ConnectionError, ConnectionResult};
use spindle_core::transport::{AgentTransport, ChunkStream};

use crate::multipart::{boundary_from_content_type, BoundaryDecoder};

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

// =============================================================================
// HttpTransport
// =============================================================================

/// Agent transport over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport with the given request timeout.
    pub fn new(timeout: Duration) -> ConnectionResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ConnectionError::io_with("failed to build HTTP client", e))?;

        Ok(Self { client, timeout })
    }

    fn map_error(&self, error: reqwest::Error) -> ConnectionError {
        if error.is_timeout() {
            ConnectionError::timeout(self.timeout)
        } else {
            ConnectionError::io_with(error.to_string(), error)
        }
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> ConnectionResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectionError::status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.map_error(e))
    }

    async fn open_stream(&self, url: &str) -> ConnectionResult<ChunkStream> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectionError::status(status.as_u16()));
        }

        let boundary = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(boundary_from_content_type)
            .ok_or_else(|| {
                ConnectionError::io("response is missing a multipart boundary in Content-Type")
            })?;

        tracing::debug!(%boundary, "Sample stream opened");

        let state = StreamState {
            bytes: Box::pin(response.bytes_stream()),
            decoder: BoundaryDecoder::new(&boundary),
            read_timeout: self.timeout,
            done: false,
        };

        let chunks: ChunkStream = Box::pin(futures::stream::unfold(state, drive_stream));
        Ok(chunks)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Stream adapter
// =============================================================================

struct StreamState {
    bytes: ByteStream,
    decoder: BoundaryDecoder,
    read_timeout: Duration,
    done: bool,
}

/// Pulls network bytes into the decoder until a payload completes.
///
/// Any terminal condition (read-idle timeout, transport error, agent
/// close) yields at most one final item and then ends the stream.
async fn drive_stream(mut state: StreamState) -> Option<(ConnectionResult<String>, StreamState)> {
    if state.done {
        return None;
    }

    loop {
        if let Some(payload) = state.decoder.next_payload() {
            return Some((Ok(payload), state));
        }

        if state.decoder.is_finished() {
            state.done = true;
            return None;
        }

        match tokio::time::timeout(state.read_timeout, state.bytes.next()).await {
            Ok(Some(Ok(chunk))) => state.decoder.extend(&chunk),
            Ok(Some(Err(error))) => {
                state.done = true;
                let cause = if error.is_timeout() {
                    ConnectionError::timeout(state.read_timeout)
                } else {
                    ConnectionError::io_with(error.to_string(), error)
                };
                return Some((Err(cause), state));
            }
            Ok(None) => {
                state.done = true;
                return match state.decoder.finish() {
                    Some(payload) => Some((Ok(payload), state)),
                    None => None,
                };
            }
            Err(_elapsed) => {
                state.done = true;
                return Some((Err(ConnectionError::timeout(state.read_timeout)), state));
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_construction() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_fetch_maps_refused_connection() {
        // Nothing listens on this port of the loopback interface.
        let transport = HttpTransport::new(Duration::from_millis(500)).unwrap();

        let result = transport.fetch("http://127.0.0.1:1/probe").await;

        match result {
            Err(ConnectionError::Io { .. }) | Err(ConnectionError::Timeout { .. }) => {}
            other => panic!("Expected a connection-domain failure, got {other:?}"),
        }
    }
}
