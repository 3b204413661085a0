//! DNS preflight for hosts registered through the admin endpoint.
//!
//! Queries a DNS-over-HTTPS resolver with the JSON API
//! (`application/dns-json`) and accepts the host only if an A record with a
//! valid IPv4 address comes back.

use std::net::{IpAddr, Ipv4Addr};

use anyhow::{Result, anyhow, bail};
use hostwatch::Target;
use serde::Deserialize;
use tracing::debug;

const RECORD_TYPE_A: u16 = 1;

pub const DEFAULT_DNS_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

#[derive(Debug, Deserialize)]
pub struct DnsResponse {
    #[serde(rename = "Status")]
    pub status: i32,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DnsAnswer>,
}

#[derive(Debug, Deserialize)]
pub struct DnsAnswer {
    #[serde(rename = "type")]
    pub record_type: u16,
    pub data: String,
}

impl DnsResponse {
    /// First A answer holding a valid IPv4 address
    pub fn first_ipv4(&self) -> Option<Ipv4Addr> {
        self.answer
            .iter()
            .filter(|answer| answer.record_type == RECORD_TYPE_A)
            .find_map(|answer| answer.data.trim().parse().ok())
    }
}

#[derive(Clone)]
pub struct DnsChecker {
    client: reqwest::Client,
    endpoint: String,
}

impl DnsChecker {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Check that the host part of a host key resolves to an IPv4 address
    pub async fn check(&self, host_key: &str) -> Result<()> {
        let hostname = Target::parse(host_key).map_err(|e| anyhow!(e))?.hostname();

        // Nothing to resolve for IP literals
        if hostname.parse::<IpAddr>().is_ok() {
            return Ok(());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("type", "A"), ("name", hostname.as_str())])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            bail!("status code of DNS query response is {}", response.status().as_u16());
        }

        let dns: DnsResponse = response.json().await?;
        match dns.first_ipv4() {
            Some(addr) => {
                debug!(host = %hostname, %addr, "DNS preflight passed");
                Ok(())
            }
            None => bail!("DNS with type A for host {hostname} has not been found (status {})", dns.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_ipv4_skips_cname_answers() {
        let raw = r#"{
            "Status": 0, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false,
            "Question": [{"name": "www.example.com.", "type": 1}],
            "Answer": [
                {"name": "www.example.com.", "type": 5, "TTL": 300, "data": "example.com."},
                {"name": "example.com.", "type": 1, "TTL": 300, "data": " 93.184.216.34 "}
            ]
        }"#;
        let response: DnsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_ipv4(), Some(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn test_missing_answer_section() {
        let response: DnsResponse = serde_json::from_str(r#"{"Status": 3}"#).unwrap();
        assert_eq!(response.first_ipv4(), None);
    }

    #[test]
    fn test_out_of_range_octets_are_rejected() {
        let raw = r#"{"Status": 0, "Answer": [{"name": "x.", "type": 1, "data": "256.1.1.1"}]}"#;
        let response: DnsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_ipv4(), None);
    }

    #[tokio::test]
    async fn test_ip_literal_skips_lookup() {
        // The endpoint is unreachable: an IP literal must never hit it
        let checker = DnsChecker::new(reqwest::Client::new(), "http://127.0.0.1:9/".to_string());
        assert!(checker.check("http://10.1.1.1:8080/health").await.is_ok());
        assert!(checker.check("192.168.0.1").await.is_ok());
    }
}
