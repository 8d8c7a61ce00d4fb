// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed MTConnect documents.
//!
//! This module defines the in-memory representation of the four document
//! kinds an MTConnect agent can return:
//!
//! - **MTConnectDevices**: device inventory from a probe request
//! - **MTConnectStreams**: observation snapshots and stream chunks
//! - **MTConnectAssets**: asset documents
//! - **MTConnectError**: protocol-level error reports
//!
//! All documents carry an [`AgentHeader`] with the agent's instance identity
//! and sequence bookkeeping. The header drives the client's sample window
//! management, so its fields are documented in terms of the agent's rolling
//! buffer semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Observation value reported by agents for data items with no known value.
pub const UNAVAILABLE: &str = "UNAVAILABLE";

/// Observation kind signalling that an asset document changed on the agent.
pub const ASSET_CHANGED: &str = "AssetChanged";

// =============================================================================
// AgentHeader
// =============================================================================

/// Header attributes common to every MTConnect response document.
///
/// Sequence fields describe the agent's rolling buffer at the time the
/// document was produced. On a well-formed agent
/// `first_sequence <= next_sequence <= last_sequence + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentHeader {
    /// Identifier assigned by the agent at startup. A change signals an
    /// agent restart and invalidates every stored sequence number.
    pub instance_id: u64,
    /// Oldest sequence still held in the agent's buffer.
    pub first_sequence: u64,
    /// Newest sequence held in the agent's buffer.
    pub last_sequence: u64,
    /// Sequence the agent will assign to the next observation.
    pub next_sequence: u64,
    /// Buffer retention window, in sequences.
    pub buffer_size: u64,
    /// Agent software version string, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Hostname the agent reports for itself, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Time the document was created on the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
}

impl AgentHeader {
    /// Returns `true` if the sequence fields satisfy the buffer invariant.
    pub fn is_consistent(&self) -> bool {
        self.first_sequence <= self.next_sequence
            && self.next_sequence <= self.last_sequence.saturating_add(1)
    }
}

// =============================================================================
// MTConnectDevices
// =============================================================================

/// A single device entry from a probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Element id.
    pub id: String,
    /// Device name, used for request path selection.
    pub name: String,
    /// Device UUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Free-form description text, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Device inventory returned by a probe request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DevicesDocument {
    /// Document header.
    pub header: AgentHeader,
    /// Devices exposed by the agent.
    pub devices: Vec<Device>,
}

impl DevicesDocument {
    /// Looks up a device by name.
    pub fn device_named(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }
}

// =============================================================================
// MTConnectStreams
// =============================================================================

/// The reporting category of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObservationCategory {
    /// Continuous measured value.
    Sample,
    /// Discrete state change.
    #[default]
    Event,
    /// Health condition of a component.
    Condition,
}

/// A single observation from a streams document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation kind, e.g. `"Position"`, `"Execution"`, `"AssetChanged"`.
    pub kind: String,
    /// Reporting category.
    pub category: ObservationCategory,
    /// Id of the data item this observation belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_item_id: Option<String>,
    /// Data item name, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sequence number assigned by the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    /// Observation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Reported value text.
    pub value: String,
}

impl Observation {
    /// Returns `true` if the value is the agent's unavailable sentinel.
    pub fn is_unavailable(&self) -> bool {
        self.value == UNAVAILABLE
    }
}

/// Observations grouped under one component of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStream {
    /// Component type, e.g. `"Controller"`, `"Linear"`.
    pub component: String,
    /// Component name, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Component element id, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    /// Observations reported for this component.
    pub observations: Vec<Observation>,
}

/// All observations for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStream {
    /// Device name.
    pub name: String,
    /// Device UUID, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Per-component observation groups.
    pub components: Vec<ComponentStream>,
}

impl DeviceStream {
    /// Iterates over every observation in the stream.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.components.iter().flat_map(|c| c.observations.iter())
    }
}

/// Observation snapshot or stream chunk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamsDocument {
    /// Document header.
    pub header: AgentHeader,
    /// Per-device observation streams.
    pub streams: Vec<DeviceStream>,
}

impl StreamsDocument {
    /// Total number of observations across all device streams.
    ///
    /// This count advances the sample window after each stream chunk.
    pub fn observation_count(&self) -> u64 {
        self.streams
            .iter()
            .map(|s| s.observations().count() as u64)
            .sum()
    }

    /// Selects the device stream matching `name`, or the first stream
    /// when no name filter is given.
    pub fn device_stream(&self, name: Option<&str>) -> Option<&DeviceStream> {
        match name {
            Some(n) => self.streams.iter().find(|s| s.name == n),
            None => self.streams.first(),
        }
    }
}

// =============================================================================
// MTConnectAssets
// =============================================================================

/// A single asset document entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset id.
    pub asset_id: String,
    /// Asset type, e.g. `"CuttingTool"`, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// UUID of the owning device, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_uuid: Option<String>,
    /// Asset timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Raw inner XML of the asset body.
    pub content: String,
}

/// Asset inventory returned by an assets request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetsDocument {
    /// Document header.
    pub header: AgentHeader,
    /// Assets held by the agent.
    pub assets: Vec<Asset>,
}

// =============================================================================
// MTConnectError
// =============================================================================

/// One coded error entry from an MTConnectError document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    /// Error code, e.g. `"OUT_OF_RANGE"`.
    pub code: String,
    /// Human-readable error text.
    pub message: String,
}

/// Protocol-level error report returned by the agent with a 2xx status.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorDocument {
    /// Document header, when the agent included one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<AgentHeader>,
    /// Reported errors.
    pub errors: Vec<AgentError>,
}

impl ErrorDocument {
    /// Renders the error entries as a single log-friendly line.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            return "agent error document with no entries".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(kind: &str, value: &str) -> Observation {
        Observation {
            kind: kind.to_string(),
            category: ObservationCategory::Event,
            data_item_id: None,
            name: None,
            sequence: None,
            timestamp: None,
            value: value.to_string(),
        }
    }

    fn streams_with(names: &[&str], per_stream: usize) -> StreamsDocument {
        StreamsDocument {
            header: AgentHeader::default(),
            streams: names
                .iter()
                .map(|name| DeviceStream {
                    name: name.to_string(),
                    uuid: None,
                    components: vec![ComponentStream {
                        component: "Controller".to_string(),
                        name: None,
                        component_id: None,
                        observations: (0..per_stream)
                            .map(|_| observation("Execution", "ACTIVE"))
                            .collect(),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_header_consistency() {
        let header = AgentHeader {
            first_sequence: 1,
            next_sequence: 1000,
            last_sequence: 999,
            ..Default::default()
        };
        assert!(header.is_consistent());

        let bad = AgentHeader {
            first_sequence: 500,
            next_sequence: 400,
            last_sequence: 999,
            ..Default::default()
        };
        assert!(!bad.is_consistent());
    }

    #[test]
    fn test_observation_count() {
        let doc = streams_with(&["a", "b"], 3);
        assert_eq!(doc.observation_count(), 6);
        assert_eq!(StreamsDocument::default().observation_count(), 0);
    }

    #[test]
    fn test_device_stream_selection() {
        let doc = streams_with(&["mill-1", "mill-2"], 1);

        assert_eq!(doc.device_stream(None).unwrap().name, "mill-1");
        assert_eq!(doc.device_stream(Some("mill-2")).unwrap().name, "mill-2");
        assert!(doc.device_stream(Some("lathe-9")).is_none());
    }

    #[test]
    fn test_unavailable_sentinel() {
        assert!(observation(ASSET_CHANGED, UNAVAILABLE).is_unavailable());
        assert!(!observation(ASSET_CHANGED, "tool-7").is_unavailable());
    }

    #[test]
    fn test_error_document_summary() {
        let doc = ErrorDocument {
            header: None,
            errors: vec![
                AgentError {
                    code: "OUT_OF_RANGE".to_string(),
                    message: "from is earlier than the buffer".to_string(),
                },
                AgentError {
                    code: "INVALID_REQUEST".to_string(),
                    message: "bad count".to_string(),
                },
            ],
        };

        let summary = doc.summary();
        assert!(summary.contains("OUT_OF_RANGE"));
        assert!(summary.contains("INVALID_REQUEST"));

        assert!(ErrorDocument::default().summary().contains("no entries"));
    }

    #[test]
    fn test_document_serialization_round_trip() {
        let doc = streams_with(&["vmc"], 2);
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: StreamsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
