// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Namespace to protocol version resolution.
//!
//! MTConnect namespaces carry the schema version as their last segment,
//! e.g. `urn:mtconnect.org:MTConnectStreams:1.3`. Foreign namespaces
//! resolve to `None`.

const MTCONNECT_URN_PREFIX: &str = "urn:mtconnect.org:MTConnect";

/// Resolves an XML namespace to its MTConnect schema version.
pub fn mtconnect_version(namespace: &str) -> Option<f64> {
    if !namespace.starts_with(MTCONNECT_URN_PREFIX) {
        return None;
    }

    namespace.rsplit(':').next()?.parse().ok()
}

/// Returns `true` if the namespace belongs to the MTConnect standard.
pub fn is_mtconnect_namespace(namespace: &str) -> bool {
    mtconnect_version(namespace).is_some()
}

// =============================================================================
// Tests
// =============================================================================
