// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! MTConnectDevices parsing.

use roxmltree::{Document, Node};

use spindle_core::document::{Device, DevicesDocument};

use crate::header::{attr_string, child_element, parse_header};

/// Parses a devices document from its XML root.
pub(crate) fn parse_devices_document(doc: &Document) -> DevicesDocument {
    let root = doc.root_element();
    let header = parse_header(&root);

    let devices = child_element(&root, "Devices")
        .map(|devices| {
            devices
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "Device")
                .map(|n| parse_device(&n))
                .collect()
        })
        .unwrap_or_default();

    DevicesDocument { header, devices }
}

fn parse_device(node: &Node) -> Device {
    let description = child_element(node, "Description")
        .and_then(|d| d.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    Device {
        id: attr_string(node, "id").unwrap_or_default(),
        name: attr_string(node, "name").unwrap_or_default(),
        uuid: attr_string(node, "uuid"),
        description,
    }
}

// =============================================================================
// Tests
// =============================================================================
