// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Document parsing seam.
//!
//! The session machinery never touches XML. It hands response bodies to a
//! [`DocumentParser`] and receives a [`ParseOutcome`], a total sum type
//! distinguishing the three things a body can be: the expected document,
//! an MTConnectError document, or neither.

use crate::document::{AssetsDocument, DevicesDocument, ErrorDocument, StreamsDocument};

// =============================================================================
// ParseOutcome
// =============================================================================

/// Result of parsing a response body against an expected document kind.
///
/// Agents may answer any request with an MTConnectError document under a
/// 2xx status, so every parse entry point recognizes it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The body is the expected document.
    Document(T),
    /// The body is an MTConnectError document.
    AgentError(ErrorDocument),
    /// The body is none of the expected document shapes.
    Unrecognized,
}

impl<T> ParseOutcome<T> {
    /// Returns `true` if the body was the expected document.
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    /// Extracts the document, if present.
    pub fn into_document(self) -> Option<T> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Maps the document variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Document(doc) => ParseOutcome::Document(f(doc)),
            Self::AgentError(err) => ParseOutcome::AgentError(err),
            Self::Unrecognized => ParseOutcome::Unrecognized,
        }
    }
}

// =============================================================================
// DocumentParser Trait
// =============================================================================

/// Parses agent response bodies into typed documents.
///
/// One entry point per document kind. Implementations must be
/// `Send + Sync`; the client shares one parser between the session loop
/// and detached asset refresh tasks.
pub trait DocumentParser: Send + Sync {
    /// Parses an MTConnectDevices body.
    fn parse_devices(&self, body: &str) -> ParseOutcome<DevicesDocument>;

    /// Parses an MTConnectStreams body.
    fn parse_streams(&self, body: &str) -> ParseOutcome<StreamsDocument>;

    /// Parses an MTConnectAssets body.
    fn parse_assets(&self, body: &str) -> ParseOutcome<AssetsDocument>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let outcome: ParseOutcome<u32> = ParseOutcome::Document(7);
        assert!(outcome.is_document());
        assert_eq!(outcome.clone().into_document(), Some(7));
        assert_eq!(outcome.map(|n| n * 2).into_document(), Some(14));

        let missing: ParseOutcome<u32> = ParseOutcome::Unrecognized;
        assert!(!missing.is_document());
        assert_eq!(missing.into_document(), None);
    }

    #[test]
    fn test_map_preserves_error_variants() {
        let err: ParseOutcome<u32> = ParseOutcome::AgentError(ErrorDocument::default());
        assert!(matches!(err.map(|n| n + 1), ParseOutcome::AgentError(_)));

        let unknown: ParseOutcome<u32> = ParseOutcome::Unrecognized;
        assert!(matches!(unknown.map(|n| n + 1), ParseOutcome::Unrecognized));
    }
}
