// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # spindle-xml
//!
//! MTConnect XML parsing for the SPINDLE client.
//!
//! Implements the `DocumentParser` seam with `roxmltree`. The root
//! element name selects the document kind; every entry point also
//! recognizes `MTConnectError` bodies, which agents may return for any
//! request under a 2xx status:
//!
//! | Root element | Outcome |
//! |--------------|---------|
//! | expected kind | `Document` |
//! | `MTConnectError` | `AgentError` |
//! | anything else, or not XML | `Unrecognized` |
//!
//! Documents carrying a namespace outside the MTConnect standard are
//! treated as unrecognized.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod assets;
mod devices;
mod header;
mod streams;
pub mod version;

use roxmltree::Document;

use spindle_core::document::{
    AgentError, AssetsDocument, DevicesDocument, ErrorDocument, StreamsDocument,
};
use spindle_core::parser::{DocumentParser, ParseOutcome};

use crate::header::parse_header;
use crate::version::is_mtconnect_namespace;

pub use version::mtconnect_version;

// =============================================================================
// XmlParser
// =============================================================================

/// The `roxmltree`-backed document parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl XmlParser {
    /// Creates a parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a body and dispatches on its root element name.
    fn parse_as<T>(
        &self,
        body: &str,
        expected_root: &str,
        build: impl FnOnce(&Document) -> T,
    ) -> ParseOutcome<T> {
        let doc = match Document::parse(body) {
            Ok(doc) => doc,
            Err(error) => {
                tracing::trace!(%error, "Body is not well-formed XML");
                return ParseOutcome::Unrecognized;
            }
        };

        let root = doc.root_element();
        if let Some(namespace) = root.tag_name().namespace() {
            if !is_mtconnect_namespace(namespace) {
                return ParseOutcome::Unrecognized;
            }
        }

        match root.tag_name().name() {
            name if name == expected_root => ParseOutcome::Document(build(&doc)),
            "MTConnectError" => ParseOutcome::AgentError(parse_error_document(&doc)),
            _ => ParseOutcome::Unrecognized,
        }
    }
}

impl DocumentParser for XmlParser {
    fn parse_devices(&self, body: &str) -> ParseOutcome<DevicesDocument> {
        self.parse_as(body, "MTConnectDevices", devices::parse_devices_document)
    }

    fn parse_streams(&self, body: &str) -> ParseOutcome<StreamsDocument> {
        self.parse_as(body, "MTConnectStreams", streams::parse_streams_document)
    }

    fn parse_assets(&self, body: &str) -> ParseOutcome<AssetsDocument> {
        self.parse_as(body, "MTConnectAssets", |doc| {
            assets::parse_assets_document(doc, body)
        })
    }
}

// =============================================================================
// MTConnectError
// =============================================================================

/// Parses an MTConnectError document.
///
/// Handles both the modern `<Errors>` collection and the single
/// `<Error>` element of older schema versions.
fn parse_error_document(doc: &Document) -> ErrorDocument {
    let root = doc.root_element();

    let errors = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Error")
        .map(|n| AgentError {
            code: n.attribute("errorCode").unwrap_or_default().to_string(),
            message: n.text().unwrap_or_default().trim().to_string(),
        })
        .collect();

    ErrorDocument {
        header: Some(parse_header(&root)),
        errors,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectError xmlns="urn:mtconnect.org:MTConnectError:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="42"/>
  <Errors>
    <Error errorCode="OUT_OF_RANGE">'from' must be greater than 431</Error>
  </Errors>
</MTConnectError>"#;

    #[test]
    fn test_error_document_recognized_everywhere() {
        let parser = XmlParser::new();

        for outcome in [
            parser.parse_devices(ERROR_XML).map(|_| ()),
            parser.parse_streams(ERROR_XML).map(|_| ()),
            parser.parse_assets(ERROR_XML).map(|_| ()),
        ] {
            match outcome {
                ParseOutcome::AgentError(doc) => {
                    assert_eq!(doc.errors.len(), 1);
                    assert_eq!(doc.errors[0].code, "OUT_OF_RANGE");
                    assert_eq!(doc.header.as_ref().unwrap().instance_id, 42);
                }
                other => panic!("Expected AgentError, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_legacy_single_error_element() {
        let xml = r#"<MTConnectError xmlns="urn:mtconnect.org:MTConnectError:1.1">
            <Header instanceId="7"/>
            <Error errorCode="UNSUPPORTED">bad path</Error>
        </MTConnectError>"#;

        match XmlParser::new().parse_streams(xml) {
            ParseOutcome::AgentError(doc) => {
                assert_eq!(doc.errors.len(), 1);
                assert_eq!(doc.errors[0].code, "UNSUPPORTED");
            }
            other => panic!("Expected AgentError, got {other:?}"),
        }
    }

    #[test]
    fn test_non_xml_unrecognized() {
        let parser = XmlParser::new();
        assert_eq!(
            parser.parse_streams("plain text, not xml").map(|_| ()),
            ParseOutcome::Unrecognized
        );
    }

    #[test]
    fn test_wrong_document_kind_unrecognized() {
        let devices = r#"<MTConnectDevices><Header/><Devices/></MTConnectDevices>"#;
        assert_eq!(
            XmlParser::new().parse_streams(devices).map(|_| ()),
            ParseOutcome::Unrecognized
        );
    }

    #[test]
    fn test_foreign_namespace_unrecognized() {
        let xml = r#"<MTConnectStreams xmlns="urn:example.org:NotMtc:1.0">
            <Header/><Streams/>
        </MTConnectStreams>"#;
        assert_eq!(
            XmlParser::new().parse_streams(xml).map(|_| ()),
            ParseOutcome::Unrecognized
        );
    }

    #[test]
    fn test_expected_document_parses() {
        let xml = r#"<MTConnectStreams xmlns="urn:mtconnect.org:MTConnectStreams:1.3">
            <Header instanceId="42" nextSequence="457"/>
            <Streams/>
        </MTConnectStreams>"#;

        match XmlParser::new().parse_streams(xml) {
            ParseOutcome::Document(doc) => {
                assert_eq!(doc.header.instance_id, 42);
                assert_eq!(doc.header.next_sequence, 457);
            }
            other => panic!("Expected Document, got {other:?}"),
        }
    }
}
