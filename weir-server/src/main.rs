mod args;
mod selector_metrics;
mod server;
mod service_configuration;
mod sources;

use std::{fs::read_to_string, path::Path, sync::Arc};

use crate::{
    args::Args,
    selector_metrics::init_metrics,
    server::AppState,
    service_configuration::{LoadConfiguration, ServiceConfiguration},
    sources::build_sources,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use weir_core::{Refresher, SelectionStore};

use tracing::info;
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Parse command line arguments
    let args = Args::parse();

    // Load the configuration from the specified YAML file
    let config_content = read_to_string(Path::new(&args.config_file))?;
    let mut load_config: LoadConfiguration = serde_yaml::from_str(&config_content)?;

    // If `refresh_interval_seconds` is provided via command-line args, override the
    // value from the config file before validation
    if let Some(seconds) = args.refresh_interval_seconds {
        load_config.selector.refresh_interval_seconds = Some(seconds as i64);
    }

    // Attempt to transform LoadConfiguration into ServiceConfiguration
    let mut service_config: ServiceConfiguration = load_config.try_into()?;

    // If `listen_addr` is provided via command-line args, override the value from the config file
    if let Some(listen_addr) = args.listen_addr {
        let listen_address: SocketAddr = listen_addr.parse().context(format!(
            "Failed to parse into Socket address: {}",
            listen_addr
        ))?;
        service_config.listen_addr = listen_address;
    }

    // If `prom_exporter` is provided via command-line args, override the value from the config file
    if let Some(prom_exporter) = args.prom_exporter {
        let prom_address: SocketAddr = prom_exporter.parse().context(format!(
            "Failed to parse into Socket address: {}",
            prom_exporter
        ))?;
        service_config.prom_exporter = Some(prom_address);
    }

    // Init metrics with or without prometheus exporter
    if let Some(prometheus_exporter) = service_config.prom_exporter {
        init_metrics(Some(prometheus_exporter));
    } else {
        init_metrics(None)
    }

    // Build the metric sources declared in the config file
    let sources = build_sources(&service_config.source, &service_config.selector)?;

    let listen_addr = service_config.listen_addr;
    let selector_config = Arc::new(service_config.selector);

    info!(
        "Initializing Weir shard selector service on {}",
        listen_addr
    );

    // The store holds the published selections; the refresher is its single writer.
    let store = Arc::new(SelectionStore::new());
    let cancel = CancellationToken::new();

    let refresher = Arc::new(Refresher::new(
        selector_config.clone(),
        sources,
        store.clone(),
    ));
    let refresher_handle = refresher.start_with_cancel(cancel.clone());

    let app_state = Arc::new(AppState {
        store,
        config: selector_config,
    });

    // Serves until shutdown; ctrl-c cancels the refresher through the token.
    server::run(listen_addr, app_state, cancel).await?;

    refresher_handle.await??;

    info!("Weir shard selector service has stopped");

    Ok(())
}
