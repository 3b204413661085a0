use std::net::IpAddr;
use std::time::{Duration, Instant};

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tokio::time::timeout;
use tracing::warn;
use url::Url;

use crate::error::{ConfigError, ProbeError};

const ICMP_PAYLOAD: [u8; 56] = [0; 56];

/// HTTP/HTTPS checker.
///
/// The target is up when the request completes and the status is below 500:
/// a 4xx still proves the host is reachable.
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(1024)
            .pool_idle_timeout(Duration::from_secs(60))
            .user_agent(concat!("hostwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    pub async fn check(&self, url: &Url) -> Result<Duration, ProbeError> {
        let start = Instant::now();

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(self.timeout)
            } else {
                ProbeError::Http(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status < 500 { Ok(start.elapsed()) } else { Err(ProbeError::HttpStatus(status)) }
    }
}

/// TCP connect checker
pub struct TcpChecker {
    timeout: Duration,
}

impl TcpChecker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn check(&self, host: &str, port: u16) -> Result<Duration, ProbeError> {
        let start = Instant::now();

        // The stream is dropped right away; only the handshake matters.
        timeout(self.timeout, tokio::net::TcpStream::connect((host, port)))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| ProbeError::Connect(e.to_string()))?;

        Ok(start.elapsed())
    }
}

/// ICMP echo checker.
///
/// Sockets are opened once and shared by every probe. Opening them needs
/// either `CAP_NET_RAW` or an unprivileged ping group; when that fails the
/// checker still builds, and ICMP probes report the missing socket as
/// their failure reason.
pub struct IcmpChecker {
    timeout: Duration,
    v4: Option<Client>,
    v6: Option<Client>,
}

impl IcmpChecker {
    /// Must be called from within a tokio runtime.
    pub fn new(timeout: Duration) -> Self {
        let v4 = Client::new(&Config::default())
            .inspect_err(|e| warn!("ICMPv4 socket unavailable, ICMP probes will fail: {e}"))
            .ok();
        let v6 = Client::new(&Config::builder().kind(ICMP::V6).build())
            .inspect_err(|e| warn!("ICMPv6 socket unavailable, ICMPv6 probes will fail: {e}"))
            .ok();

        Self { timeout, v4, v6 }
    }

    pub async fn check(&self, host: &str) -> Result<Duration, ProbeError> {
        let addr = self.resolve(host).await?;

        let client = match addr {
            IpAddr::V4(_) => self.v4.as_ref(),
            IpAddr::V6(_) => self.v6.as_ref(),
        }
        .ok_or_else(|| ProbeError::Icmp("no ICMP socket available".to_string()))?;

        let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(self.timeout);

        let (_reply, rtt) = pinger
            .ping(PingSequence(0), &ICMP_PAYLOAD)
            .await
            .map_err(|e| ProbeError::Icmp(e.to_string()))?;

        Ok(rtt)
    }

    async fn resolve(&self, host: &str) -> Result<IpAddr, ProbeError> {
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(addr);
        }

        let resolve_err = |reason: String| ProbeError::Resolve { host: host.to_string(), reason };

        let mut addrs = timeout(self.timeout, tokio::net::lookup_host((host, 0)))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| resolve_err(e.to_string()))?;

        addrs
            .next()
            .map(|sock| sock.ip())
            .ok_or_else(|| resolve_err("no addresses returned".to_string()))
    }
}
