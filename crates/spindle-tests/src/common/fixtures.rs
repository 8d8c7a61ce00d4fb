// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Agent response fixtures.
//!
//! XML bodies shaped like real agent responses, parameterized on the
//! header fields the session arithmetic depends on. All fixtures use the
//! device name [`DEVICE`].

/// Device name used across all fixtures.
pub const DEVICE: &str = "VMC-3Axis";

/// A probe response with one device.
pub fn devices_xml(instance_id: u64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectDevices xmlns="urn:mtconnect.org:MTConnectDevices:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="{instance_id}" bufferSize="131072"/>
  <Devices>
    <Device id="d1" name="{DEVICE}" uuid="dev-uuid-1">
      <Description>3-axis vertical machining center</Description>
    </Device>
  </Devices>
</MTConnectDevices>"#
    )
}

/// A current response with the given header and a single execution event.
pub fn current_xml(instance_id: u64, first: u64, next: u64, last: u64, buffer: u64) -> String {
    streams_xml(instance_id, first, next, last, buffer, "")
}

/// A current response whose device stream carries an `AssetChanged`
/// observation.
pub fn current_with_asset_changed(
    instance_id: u64,
    first: u64,
    next: u64,
    last: u64,
    buffer: u64,
    asset_id: &str,
) -> String {
    let changed = format!(
        r#"<AssetChanged dataItemId="d1-asset-chg" timestamp="2024-03-01T08:00:00Z">{asset_id}</AssetChanged>"#
    );
    streams_xml(instance_id, first, next, last, buffer, &changed)
}

/// A sample stream chunk carrying the given `(kind, value)` observations.
pub fn sample_chunk(instance_id: u64, next: u64, observations: &[(&str, &str)]) -> String {
    let events: String = observations
        .iter()
        .map(|(kind, value)| {
            format!(r#"<{kind} dataItemId="d1-{kind}" timestamp="2024-03-01T08:00:01Z">{value}</{kind}>"#)
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectStreams xmlns="urn:mtconnect.org:MTConnectStreams:1.3">
  <Header creationTime="2024-03-01T08:00:01Z" instanceId="{instance_id}" bufferSize="131072"
          firstSequence="1" lastSequence="{}" nextSequence="{next}"/>
  <Streams>
    <DeviceStream name="{DEVICE}" uuid="dev-uuid-1">
      <ComponentStream component="Device" componentId="dev">
        <Events>{events}</Events>
      </ComponentStream>
    </DeviceStream>
  </Streams>
</MTConnectStreams>"#,
        next.saturating_sub(1)
    )
}

/// An assets response with one cutting tool.
pub fn assets_xml(instance_id: u64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectAssets xmlns="urn:mtconnect.org:MTConnectAssets:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="{instance_id}"/>
  <Assets>
    <CuttingTool assetId="TOOL-7" deviceUuid="dev-uuid-1" timestamp="2024-03-01T08:00:00Z">
      <CuttingToolLifeCycle><ToolLife type="MINUTES">120</ToolLife></CuttingToolLifeCycle>
    </CuttingTool>
  </Assets>
</MTConnectAssets>"#
    )
}

/// An MTConnectError response.
pub fn error_xml(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectError xmlns="urn:mtconnect.org:MTConnectError:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="1"/>
  <Errors>
    <Error errorCode="{code}">{message}</Error>
  </Errors>
</MTConnectError>"#
    )
}

fn streams_xml(
    instance_id: u64,
    first: u64,
    next: u64,
    last: u64,
    buffer: u64,
    extra_events: &str,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<MTConnectStreams xmlns="urn:mtconnect.org:MTConnectStreams:1.3">
  <Header creationTime="2024-03-01T08:00:00Z" instanceId="{instance_id}" bufferSize="{buffer}"
          firstSequence="{first}" lastSequence="{last}" nextSequence="{next}"/>
  <Streams>
    <DeviceStream name="{DEVICE}" uuid="dev-uuid-1">
      <ComponentStream component="Controller" componentId="cont">
        <Events>
          <Execution dataItemId="d1-exec" timestamp="2024-03-01T08:00:00Z">ACTIVE</Execution>
          {extra_events}
        </Events>
      </ComponentStream>
    </DeviceStream>
  </Streams>
</MTConnectStreams>"#
    )
}
