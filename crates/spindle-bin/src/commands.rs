// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command implementations.

use std::sync::Arc;

use spindle_client::SpindleClient;
use spindle_core::config::ClientConfig;
use spindle_core::error::{RequestFailure, SpindleError};
use spindle_core::event::TracingHandler;
use spindle_core::parser::{DocumentParser, ParseOutcome};
use spindle_core::transport::AgentTransport;
use spindle_http::HttpTransport;
use spindle_xml::XmlParser;

use crate::cli::{AgentArgs, Cli, Commands};
use crate::error::BinResult;

/// Executes the parsed command.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Probe(args) => probe(args).await,
        Commands::Version => {
            println!("spindle {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Streams telemetry from the agent until SIGINT/SIGTERM.
async fn run(args: AgentArgs) -> BinResult<()> {
    let config = args.to_config()?;
    let client = build_client(config)?;

    client.subscribe(Arc::new(TracingHandler::new()));
    client.start()?;

    wait_for_signal().await;
    tracing::info!("Shutdown requested");

    client.stop();
    client.join().await;
    Ok(())
}

/// Fetches and prints the agent's device inventory.
async fn probe(args: AgentArgs) -> BinResult<()> {
    let config = args.to_config()?;
    let transport = HttpTransport::new(config.timeout()).map_err(SpindleError::from)?;

    let body = transport
        .fetch(&config.probe_url())
        .await
        .map_err(SpindleError::from)?;

    let doc = match XmlParser::new().parse_devices(&body) {
        ParseOutcome::Document(doc) => doc,
        ParseOutcome::AgentError(err) => {
            return Err(SpindleError::from(RequestFailure::agent_error(err)).into());
        }
        ParseOutcome::Unrecognized => {
            return Err(SpindleError::from(RequestFailure::unrecognized(body)).into());
        }
    };

    println!(
        "agent instance {} ({} devices)",
        doc.header.instance_id,
        doc.devices.len()
    );
    for device in &doc.devices {
        match &device.uuid {
            Some(uuid) => println!("  {} [{}] uuid={}", device.name, device.id, uuid),
            None => println!("  {} [{}]", device.name, device.id),
        }
    }
    Ok(())
}

fn build_client(config: ClientConfig) -> BinResult<SpindleClient> {
    let transport = HttpTransport::new(config.timeout()).map_err(SpindleError::from)?;

    Ok(SpindleClient::builder()
        .config(config)
        .transport(Arc::new(transport))
        .parser(Arc::new(XmlParser::new()))
        .build()?)
}

/// Waits for SIGINT or SIGTERM.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(error) => {
                tracing::error!(%error, "Failed to register SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received Ctrl+C");
    }
}
