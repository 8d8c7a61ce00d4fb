// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! MTConnectAssets parsing.
//!
//! Asset bodies are schema-extensible (cutting tools, fixtures, vendor
//! types), so the parser keeps the asset element's source text verbatim
//! as the content and lifts only the common attributes.

use roxmltree::{Document, Node};

use spindle_core::document::{Asset, AssetsDocument};

use crate::header::{attr_string, child_element, parse_header, parse_timestamp};

/// Parses an assets document from its XML root.
pub(crate) fn parse_assets_document(doc: &Document, body: &str) -> AssetsDocument {
    let root = doc.root_element();
    let header = parse_header(&root);

    let assets = child_element(&root, "Assets")
        .map(|assets| {
            assets
                .children()
                .filter(|n| n.is_element())
                .map(|n| parse_asset(&n, body))
                .collect()
        })
        .unwrap_or_default();

    AssetsDocument { header, assets }
}

fn parse_asset(node: &Node, body: &str) -> Asset {
    Asset {
        asset_id: attr_string(node, "assetId").unwrap_or_default(),
        kind: Some(node.tag_name().name().to_string()),
        device_uuid: attr_string(node, "deviceUuid"),
        timestamp: node.attribute("timestamp").and_then(parse_timestamp),
        content: body[node.range()].to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ASSETS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectAssets xmlns="urn:mtconnect.org:MTConnectAssets:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="42"/>
  <Assets>
    <CuttingTool assetId="TOOL-7" deviceUuid="dev-uuid-1" timestamp="2024-03-01T08:00:00Z">
      <CuttingToolLifeCycle><ToolLife type="MINUTES">120</ToolLife></CuttingToolLifeCycle>
    </CuttingTool>
  </Assets>
</MTConnectAssets>"#;

    #[test]
    fn test_parse_assets_document() {
        let doc = Document::parse(ASSETS_XML).unwrap();
        let parsed = parse_assets_document(&doc, ASSETS_XML);

        assert_eq!(parsed.header.instance_id, 42);
        assert_eq!(parsed.assets.len(), 1);

        let tool = &parsed.assets[0];
        assert_eq!(tool.asset_id, "TOOL-7");
        assert_eq!(tool.kind.as_deref(), Some("CuttingTool"));
        assert_eq!(tool.device_uuid.as_deref(), Some("dev-uuid-1"));
        assert!(tool.timestamp.is_some());
        assert!(tool.content.starts_with("<CuttingTool"));
        assert!(tool.content.contains("ToolLife"));
    }

    #[test]
    fn test_empty_assets() {
        let xml = "<MTConnectAssets><Header/><Assets/></MTConnectAssets>";
        let parsed = parse_assets_document(&Document::parse(xml).unwrap(), xml);
        assert!(parsed.assets.is_empty());
    }
}
