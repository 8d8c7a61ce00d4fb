// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Failure routing onto subscriber channels.
//!
//! Every request failure belongs to one of three domains, and each domain
//! has its own subscriber channel:
//!
//! | Domain | Event |
//! |--------|-------|
//! | connection | `ConnectionError` |
//! | agent error document | `Error` |
//! | unrecognized body | `XmlError` |
//!
//! Control flow is identical for all three: the session loop backs off
//! and retries from its last safe state. Cancellation is not routed; a
//! stop request is lifecycle, not failure.

use std::sync::Arc;

use spindle_core::error::RequestFailure;
use spindle_core::event::{ClientEvent, EventDispatcher};

// =============================================================================
// ErrorRouter
// =============================================================================

/// Routes classified failures to the matching subscriber channel.
#[derive(Clone)]
pub struct ErrorRouter {
    dispatcher: Arc<EventDispatcher>,
}

impl ErrorRouter {
    /// Creates a router publishing through the given dispatcher.
    pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Publishes the event matching the failure's domain.
    ///
    /// Cancellation failures are swallowed silently.
    pub async fn route(&self, failure: RequestFailure) {
        if failure.is_cancelled() {
            return;
        }

        tracing::debug!(domain = failure.domain(), %failure, "Routing request failure");

        let event = match failure {
            RequestFailure::Connection(cause) => ClientEvent::ConnectionError {
                message: cause.to_string(),
            },
            RequestFailure::AgentError(doc) => ClientEvent::Error(Arc::new(*doc)),
            RequestFailure::Unrecognized { payload } => ClientEvent::XmlError { payload },
        };

        self.dispatcher.dispatch(&event).await;
    }
}

impl std::fmt::Debug for ErrorRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorRouter").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::document::{AgentError, ErrorDocument};
    use spindle_core::error::ConnectionError;
    use spindle_core::event::CollectorHandler;
    use std::time::Duration;

    fn router_with_collector() -> (ErrorRouter, Arc<CollectorHandler>) {
        let dispatcher = Arc::new(EventDispatcher::new());
        let collector = Arc::new(CollectorHandler::new(16));
        dispatcher.register(collector.clone());
        (ErrorRouter::new(dispatcher), collector)
    }

    #[tokio::test]
    async fn test_connection_failure_routed() {
        let (router, collector) = router_with_collector();

        router
            .route(ConnectionError::timeout(Duration::from_secs(5)).into())
            .await;

        assert_eq!(collector.count_of("connection_error"), 1);
        assert_eq!(collector.len(), 1);
    }

    #[tokio::test]
    async fn test_agent_error_routed() {
        let (router, collector) = router_with_collector();

        let doc = ErrorDocument {
            header: None,
            errors: vec![AgentError {
                code: "OUT_OF_RANGE".to_string(),
                message: "from below buffer".to_string(),
            }],
        };
        router.route(RequestFailure::agent_error(doc)).await;

        assert_eq!(collector.count_of("error"), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_body_routed() {
        let (router, collector) = router_with_collector();

        router.route(RequestFailure::unrecognized("<html/>")).await;

        assert_eq!(collector.count_of("xml_error"), 1);
        match &collector.events()[0] {
            ClientEvent::XmlError { payload } => assert_eq!(payload, "<html/>"),
            other => panic!("Expected XmlError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_not_routed() {
        let (router, collector) = router_with_collector();

        router.route(ConnectionError::Cancelled.into()).await;

        assert!(collector.is_empty());
    }
}
