// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract transport layer for agent communication.
//!
//! This module defines the [`AgentTransport`] trait separating the session
//! machinery from the HTTP stack. One-shot requests return the full
//! response body; the sample stream returns a [`ChunkStream`] of
//! boundary-delimited XML payloads.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; the client shares one transport
//! between the session loop and detached asset refresh tasks.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ConnectionResult;

// =============================================================================
// ChunkStream
// =============================================================================

/// A stream of XML payloads from a long-polling sample request.
///
/// Each item is one boundary-delimited document chunk. The stream ends
/// when the agent closes the connection; transport-level failures,
/// including read-idle timeouts, surface as `Err` items. Dropping the
/// stream closes the underlying connection.
pub type ChunkStream = BoxStream<'static, ConnectionResult<String>>;

// =============================================================================
// AgentTransport Trait
// =============================================================================

/// Abstract HTTP transport for agent requests.
///
/// Implementations apply the configured timeout to one-shot requests and
/// to the connect and read-idle phases of streamed requests; an elapsed
/// timeout surfaces as [`ConnectionError::Timeout`](crate::error::ConnectionError::Timeout).
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Performs a one-shot GET and returns the response body.
    ///
    /// # Errors
    ///
    /// Any I/O failure, a non-2xx status, or a timeout returns a
    /// [`ConnectionError`](crate::error::ConnectionError). A 2xx body is returned verbatim; deciding
    /// whether it is a usable document is the parser's concern.
    async fn fetch(&self, url: &str) -> ConnectionResult<String>;

    /// Opens a streaming GET and returns its chunk stream.
    ///
    /// # Errors
    ///
    /// Connection establishment failures are returned directly; failures
    /// after the stream is open surface as `Err` items on the stream.
    async fn open_stream(&self, url: &str) -> ConnectionResult<ChunkStream>;
}
