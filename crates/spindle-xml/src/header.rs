// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Header and attribute parsing shared by all document kinds.

use chrono::{DateTime, Utc};
use roxmltree::Node;

use spindle_core::document::AgentHeader;

/// Parses the `Header` child of a document root.
///
/// Devices and assets documents omit the sequence attributes; missing
/// numeric attributes default to zero.
pub(crate) fn parse_header(root: &Node) -> AgentHeader {
    let Some(header) = child_element(root, "Header") else {
        return AgentHeader::default();
    };

    AgentHeader {
        instance_id: attr_u64(&header, "instanceId"),
        first_sequence: attr_u64(&header, "firstSequence"),
        last_sequence: attr_u64(&header, "lastSequence"),
        next_sequence: attr_u64(&header, "nextSequence"),
        buffer_size: attr_u64(&header, "bufferSize"),
        version: attr_string(&header, "version"),
        sender: attr_string(&header, "sender"),
        creation_time: header.attribute("creationTime").and_then(parse_timestamp),
    }
}

/// Finds the first child element with the given local name.
pub(crate) fn child_element<'a, 'input>(
    node: &Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Reads a numeric attribute, defaulting to zero.
pub(crate) fn attr_u64(node: &Node, name: &str) -> u64 {
    node.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Reads an owned string attribute.
pub(crate) fn attr_string(node: &Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// Parses an MTConnect timestamp (RFC 3339 with fractional seconds).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// =============================================================================
// Tests
// =============================================================================
