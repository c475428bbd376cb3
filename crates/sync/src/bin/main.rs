// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, bail};
use graphmeta_catalog::StaticQueryClient;
use graphmeta_sync::{ConnectionEvent, MetadataSync, Session, SyncConfig};
use serde_json::json;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage: graphmeta-sync <fixture.{yaml,json}> [config.{yaml,json}]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let Some(fixture_path) = args.next() else {
        bail!(USAGE);
    };
    let config = match args.next() {
        Some(path) => SyncConfig::from_path(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => SyncConfig::default(),
    };

    let client = StaticQueryClient::from_path(&fixture_path)
        .with_context(|| format!("Failed to load fixture from {}", fixture_path))?;
    let sync = MetadataSync::new(Arc::new(client), config)?;

    tracing::info!("Starting graphmeta sync against {}", fixture_path);

    let session = Session::new("cli", "cli");
    let mut cycles = sync.cycles();
    sync.handle_event(ConnectionEvent::ConnectSucceeded(session.clone()))
        .await;

    // One cycle is three round trips, each bounded by the query timeout.
    let deadline = sync.config().query_timeout * 3 + Duration::from_secs(1);
    tokio::time::timeout(deadline, cycles.wait_for(|count| *count > 0))
        .await
        .context("Timed out waiting for the first refresh cycle")?
        .context("Refresh loop stopped before completing a cycle")?;

    let state = sync.snapshot();
    let report = json!({
        "context": session.context,
        "meta": state.meta_in_context(&session.context),
        "server": state.server,
        "is_enterprise": state.is_enterprise(),
        "settings": state.settings(),
        "allow_outgoing_connections": state.allow_outgoing_connections(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    sync.handle_event(ConnectionEvent::DisconnectSucceeded(session.id))
        .await;
    sync.shutdown().await;

    Ok(())
}
