// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Asset change tracking.
//!
//! Agents report asset mutations through `AssetChanged` observations
//! inside their streams documents. The tracker watches every streams
//! document the session receives and decides which changed ids warrant an
//! asset refresh, deduplicating repeats so a value held across several
//! chunks triggers exactly one fetch.

use spindle_core::document::{StreamsDocument, ASSET_CHANGED};

// =============================================================================
// AssetChangeTracker
// =============================================================================

/// Tracks the last observed changed-asset id and detects new ones.
///
/// Owned by the session loop; all observation happens on its task.
#[derive(Debug, Default)]
pub struct AssetChangeTracker {
    last_changed_asset_id: Option<String>,
}

impl AssetChangeTracker {
    /// Creates a tracker with no observed id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently observed changed-asset id.
    pub fn last_changed_asset_id(&self) -> Option<&str> {
        self.last_changed_asset_id.as_deref()
    }

    /// Scans a streams document and returns the asset ids needing a
    /// refresh, in observation order.
    ///
    /// Only the device stream selected by `device_name` is considered
    /// (the first stream when no filter is set). A value triggers a
    /// refresh when it is neither the unavailable sentinel nor equal to
    /// the previously observed id; the tracker then remembers it, so the
    /// run `A1 A2 A2 A3 A3 A3` yields `A1, A2, A3`.
    pub fn observe(&mut self, document: &StreamsDocument, device_name: Option<&str>) -> Vec<String> {
        let Some(stream) = document.device_stream(device_name) else {
            return Vec::new();
        };

        let mut changed = Vec::new();
        for observation in stream.observations() {
            if observation.kind != ASSET_CHANGED || observation.is_unavailable() {
                continue;
            }
            if self.last_changed_asset_id.as_deref() != Some(observation.value.as_str()) {
                changed.push(observation.value.clone());
            }
            self.last_changed_asset_id = Some(observation.value.clone());
        }

        if !changed.is_empty() {
            tracing::debug!(count = changed.len(), "Asset changes detected");
        }

        changed
    }

    /// Forgets the observed id, e.g. after an agent instance change.
    pub fn reset(&mut self) {
        self.last_changed_asset_id = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::document::{
        AgentHeader, ComponentStream, DeviceStream, Observation, ObservationCategory, UNAVAILABLE,
    };

    fn asset_changed(value: &str) -> Observation {
        Observation {
            kind: ASSET_CHANGED.to_string(),
            category: ObservationCategory::Event,
            data_item_id: Some("d1_asset_chg".to_string()),
            name: None,
            sequence: None,
            timestamp: None,
            value: value.to_string(),
        }
    }

    fn document(device: &str, values: &[&str]) -> StreamsDocument {
        StreamsDocument {
            header: AgentHeader::default(),
            streams: vec![DeviceStream {
                name: device.to_string(),
                uuid: None,
                components: vec![ComponentStream {
                    component: "Device".to_string(),
                    name: None,
                    component_id: None,
                    observations: values.iter().map(|v| asset_changed(v)).collect(),
                }],
            }],
        }
    }

    #[test]
    fn test_first_observation_triggers() {
        let mut tracker = AssetChangeTracker::new();

        let changed = tracker.observe(&document("vmc", &["A1"]), None);

        assert_eq!(changed, ["A1"]);
        assert_eq!(tracker.last_changed_asset_id(), Some("A1"));
    }

    #[test]
    fn test_repeats_deduplicated() {
        let mut tracker = AssetChangeTracker::new();

        let changed = tracker.observe(
            &document("vmc", &["A1", "A2", "A2", "A3", "A3", "A3"]),
            None,
        );

        assert_eq!(changed, ["A1", "A2", "A3"]);
    }

    #[test]
    fn test_dedup_spans_documents() {
        let mut tracker = AssetChangeTracker::new();

        assert_eq!(tracker.observe(&document("vmc", &["A1"]), None), ["A1"]);
        assert!(tracker.observe(&document("vmc", &["A1"]), None).is_empty());
        assert_eq!(tracker.observe(&document("vmc", &["A2"]), None), ["A2"]);
    }

    #[test]
    fn test_unavailable_ignored() {
        let mut tracker = AssetChangeTracker::new();

        let changed = tracker.observe(&document("vmc", &[UNAVAILABLE, "A1", UNAVAILABLE]), None);

        assert_eq!(changed, ["A1"]);
        assert_eq!(tracker.last_changed_asset_id(), Some("A1"));
    }

    #[test]
    fn test_device_filter_selects_stream() {
        let mut tracker = AssetChangeTracker::new();
        let mut doc = document("mill-1", &["A1"]);
        doc.streams.push(document("mill-2", &["B1"]).streams.remove(0));

        let changed = tracker.observe(&doc, Some("mill-2"));

        assert_eq!(changed, ["B1"]);

        // No stream matches: nothing triggers, nothing is remembered.
        let mut other = AssetChangeTracker::new();
        assert!(other.observe(&doc, Some("lathe-9")).is_empty());
        assert!(other.last_changed_asset_id().is_none());
    }

    #[test]
    fn test_reset_forgets_id() {
        let mut tracker = AssetChangeTracker::new();
        tracker.observe(&document("vmc", &["A1"]), None);

        tracker.reset();

        assert!(tracker.last_changed_asset_id().is_none());
        assert_eq!(tracker.observe(&document("vmc", &["A1"]), None), ["A1"]);
    }
}
