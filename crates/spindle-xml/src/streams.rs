// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! MTConnectStreams parsing.
//!
//! Observation elements are named after their kind, grouped per category
//! under each `ComponentStream`:
//!
//! ```text
//! <Streams>
//!   <DeviceStream name="VMC-3Axis">
//!     <ComponentStream component="Controller" componentId="cont">
//!       <Samples><Position dataItemId="x1" sequence="12">4.5</Position></Samples>
//!       <Events><AssetChanged dataItemId="ac" sequence="13">TOOL-7</AssetChanged></Events>
//!       <Condition><Normal dataItemId="sys"/></Condition>
//!     </ComponentStream>
//!   </DeviceStream>
//! </Streams>
//! ```

use roxmltree::{Document, Node};

use spindle_core::document::{
    ComponentStream, DeviceStream, Observation, ObservationCategory, StreamsDocument,
};

use crate::header::{attr_string, attr_u64, child_element, parse_header, parse_timestamp};

/// Parses a streams document from its XML root.
pub(crate) fn parse_streams_document(doc: &Document) -> StreamsDocument {
    let root = doc.root_element();
    let header = parse_header(&root);

    let streams = child_element(&root, "Streams")
        .map(|streams| {
            streams
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "DeviceStream")
                .map(|n| parse_device_stream(&n))
                .collect()
        })
        .unwrap_or_default();

    StreamsDocument { header, streams }
}

fn parse_device_stream(node: &Node) -> DeviceStream {
    DeviceStream {
        name: attr_string(node, "name").unwrap_or_default(),
        uuid: attr_string(node, "uuid"),
        components: node
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "ComponentStream")
            .map(|n| parse_component_stream(&n))
            .collect(),
    }
}

fn parse_component_stream(node: &Node) -> ComponentStream {
    let mut observations = Vec::new();

    for container in node.children().filter(|n| n.is_element()) {
        let category = match container.tag_name().name() {
            "Samples" => ObservationCategory::Sample,
            "Events" => ObservationCategory::Event,
            "Condition" => ObservationCategory::Condition,
            _ => continue,
        };

        for element in container.children().filter(|n| n.is_element()) {
            observations.push(parse_observation(&element, category));
        }
    }

    ComponentStream {
        component: attr_string(node, "component").unwrap_or_default(),
        name: attr_string(node, "name"),
        component_id: attr_string(node, "componentId"),
        observations,
    }
}

fn parse_observation(node: &Node, category: ObservationCategory) -> Observation {
    let sequence = match node.attribute("sequence") {
        Some(_) => Some(attr_u64(node, "sequence")),
        None => None,
    };

    Observation {
        kind: node.tag_name().name().to_string(),
        category,
        data_item_id: attr_string(node, "dataItemId"),
        name: attr_string(node, "name"),
        sequence,
        timestamp: node.attribute("timestamp").and_then(parse_timestamp),
        value: node.text().unwrap_or_default().trim().to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STREAMS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectStreams xmlns="urn:mtconnect.org:MTConnectStreams:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="42" bufferSize="131072"
          firstSequence="1" lastSequence="456" nextSequence="457"/>
  <Streams>
    <DeviceStream name="VMC-3Axis" uuid="dev-uuid-1">
      <ComponentStream component="Linear" name="X" componentId="x-axis">
        <Samples>
          <Position dataItemId="x-pos" timestamp="2024-03-01T08:00:00Z" sequence="455" name="Xact">12.5</Position>
        </Samples>
      </ComponentStream>
      <ComponentStream component="Device" componentId="dev">
        <Events>
          <AssetChanged dataItemId="asset-chg" sequence="456">TOOL-7</AssetChanged>
        </Events>
        <Condition>
          <Normal dataItemId="sys" type="SYSTEM"/>
        </Condition>
      </ComponentStream>
    </DeviceStream>
  </Streams>
</MTConnectStreams>"#;

    #[test]
    fn test_parse_streams_document() {
        let doc = Document::parse(STREAMS_XML).unwrap();
        let parsed = parse_streams_document(&doc);

        assert_eq!(parsed.header.instance_id, 42);
        assert_eq!(parsed.header.next_sequence, 457);
        assert_eq!(parsed.streams.len(), 1);
        assert_eq!(parsed.observation_count(), 3);

        let stream = &parsed.streams[0];
        assert_eq!(stream.name, "VMC-3Axis");
        assert_eq!(stream.uuid.as_deref(), Some("dev-uuid-1"));
        assert_eq!(stream.components.len(), 2);
    }

    #[test]
    fn test_observation_fields() {
        let doc = Document::parse(STREAMS_XML).unwrap();
        let parsed = parse_streams_document(&doc);
        let stream = &parsed.streams[0];

        let position = &stream.components[0].observations[0];
        assert_eq!(position.kind, "Position");
        assert_eq!(position.category, ObservationCategory::Sample);
        assert_eq!(position.data_item_id.as_deref(), Some("x-pos"));
        assert_eq!(position.sequence, Some(455));
        assert_eq!(position.value, "12.5");

        let changed = &stream.components[1].observations[0];
        assert_eq!(changed.kind, "AssetChanged");
        assert_eq!(changed.category, ObservationCategory::Event);
        assert_eq!(changed.value, "TOOL-7");

        let condition = &stream.components[1].observations[1];
        assert_eq!(condition.kind, "Normal");
        assert_eq!(condition.category, ObservationCategory::Condition);
        assert_eq!(condition.value, "");
        assert_eq!(condition.sequence, None);
    }

    #[test]
    fn test_empty_streams() {
        let xml = r#"<MTConnectStreams><Header nextSequence="10"/><Streams/></MTConnectStreams>"#;
        let parsed = parse_streams_document(&Document::parse(xml).unwrap());

        assert!(parsed.streams.is_empty());
        assert_eq!(parsed.observation_count(), 0);
        assert_eq!(parsed.header.next_sequence, 10);
    }
}
