use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use super::checker::{HttpChecker, IcmpChecker, TcpChecker};
use super::target::Target;
use crate::error::{ConfigError, ProbeError};

/// Reachability check for a single host key.
///
/// `Ok` carries the probe latency; every failure is returned as an `Err`,
/// implementations never panic on network errors. A probe makes exactly one
/// attempt: retries only happen through the monitor's next tick.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str) -> Result<Duration, ProbeError>;
}

/// Protocol dispatcher: resolves the host key into a [`Target`] and runs the
/// matching checker under a single timeout.
pub struct ProbeDispatcher {
    timeout: Duration,
    http_checker: HttpChecker,
    tcp_checker: TcpChecker,
    icmp_checker: IcmpChecker,
}

impl ProbeDispatcher {
    /// Build the dispatcher and its shared clients.
    ///
    /// Must be called from within a tokio runtime (the ICMP sockets register
    /// with the reactor).
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            timeout,
            http_checker: HttpChecker::new(timeout)?,
            tcp_checker: TcpChecker::new(timeout),
            icmp_checker: IcmpChecker::new(timeout),
        })
    }

    async fn check(&self, target: &Target) -> Result<Duration, ProbeError> {
        match target {
            Target::Http(url) | Target::Https(url) => self.http_checker.check(url).await,
            Target::Tcp { host, port } => self.tcp_checker.check(host, *port).await,
            Target::Icmp { host } => self.icmp_checker.check(host).await,
        }
    }
}

#[async_trait]
impl Prober for ProbeDispatcher {
    async fn probe(&self, host: &str) -> Result<Duration, ProbeError> {
        let target = Target::parse(host)?;

        let result = timeout(self.timeout, self.check(&target))
            .await
            .unwrap_or(Err(ProbeError::Timeout(self.timeout)));

        match &result {
            Ok(latency) => {
                debug!(host, check = %target.check_type(), latency_ms = latency.as_millis() as u64, "probe ok")
            }
            Err(e) => debug!(host, check = %target.check_type(), error = %e, "probe failed"),
        }

        result
    }
}
