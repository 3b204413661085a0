//! hostwatch - host availability monitor
//!
//! Probes every registered host on a fixed interval and reports up/down
//! transitions. Hosts come from the config file, the command line, the
//! status store and the HTTP admin endpoint.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hostwatch::{Pool, ProbeDispatcher};
use logger::init_tracing;
use tracing::info;

mod adapters;
mod admin;
mod cli;
mod config;
mod database;
mod dns;
mod hub;

use adapters::{ServiceNotifier, StoreLoader};
use admin::AdminReceiver;
use cli::Cli;
use config::Config;
use dns::DnsChecker;
use hub::HubClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_config(cli.config.clone()).context("failed to load config")?;
    cli.apply(&mut config);
    let pool_config = config.to_pool_config()?;
    info!("{config}");

    let database = match &config.store.path {
        Some(path) => Some(database::open_database(path).await?),
        None => None,
    };

    // Shared by the hub client and the DNS preflight
    let http = reqwest::Client::builder()
        .timeout(pool_config.timeout)
        .user_agent(concat!("hostwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let hub = config
        .hub
        .url
        .clone()
        .map(|url| HubClient::new(http.clone(), url, config.hub.topic_prefix.clone()));

    let prober = ProbeDispatcher::new(pool_config.timeout)?;

    let mut pool = Pool::new(pool_config, Arc::new(prober))?
        .with_loader(StoreLoader::new(database.clone(), config.hosts.clone()))
        .with_notifier(ServiceNotifier::new(database.clone(), hub));

    if let Some(listen) = config.admin.listen {
        let dns = config
            .admin
            .dns_preflight
            .then(|| DnsChecker::new(http.clone(), config.admin.dns_endpoint.clone()));
        pool = pool.with_receiver(AdminReceiver::new(listen, database.clone(), dns));
    }

    let handle = pool.start();

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    handle.shutdown().await;

    Ok(())
}
