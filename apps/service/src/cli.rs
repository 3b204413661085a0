use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "hostwatch", version, about = "Host availability monitor")]
pub struct Cli {
    /// Config file, defaults to $XDG_CONFIG_HOME/hostwatch/config.toml
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Seconds between two probes of the same host
    #[arg(long)]
    pub interval: Option<u64>,

    /// Consecutive failed probes before a host is declared down
    #[arg(long)]
    pub fail_limit: Option<u32>,

    /// Seconds a single probe may take
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Address of the HTTP admin endpoint
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Status store file
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Hub URL transitions are published to
    #[arg(long)]
    pub hub_url: Option<String>,

    /// Topic prefix of hub messages
    #[arg(long)]
    pub hub_topic: Option<String>,

    /// Hosts to monitor in addition to the configured ones
    pub hosts: Vec<String>,
}

impl Cli {
    /// Overlay command line flags on a loaded config
    pub fn apply(self, config: &mut Config) {
        if let Some(interval) = self.interval {
            config.monitor.interval_seconds = interval;
        }
        if let Some(fail_limit) = self.fail_limit {
            config.monitor.fail_limit = fail_limit;
        }
        if let Some(timeout) = self.timeout {
            config.monitor.timeout_seconds = timeout;
        }
        if self.listen.is_some() {
            config.admin.listen = self.listen;
        }
        if self.store.is_some() {
            config.store.path = self.store;
        }
        if self.hub_url.is_some() {
            config.hub.url = self.hub_url;
        }
        if let Some(topic) = self.hub_topic {
            config.hub.topic_prefix = topic;
        }
        config.hosts.extend(self.hosts);
    }
}
