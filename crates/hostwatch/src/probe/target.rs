use std::net::IpAddr;

use tracing::debug;
use url::{Host, Url};

use crate::error::ProbeError;

/// Type of check a target resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    Http,
    Https,
    Tcp,
    Icmp,
}

impl std::fmt::Display for CheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckType::Http => write!(f, "http"),
            CheckType::Https => write!(f, "https"),
            CheckType::Tcp => write!(f, "tcp"),
            CheckType::Icmp => write!(f, "icmp"),
        }
    }
}

/// A host key resolved to the protocol used to probe it.
///
/// Resolution rules:
/// - `scheme://...` uses the scheme (`http`, `https`, `telnet`/`tcp`, `icmp`);
///   any other scheme falls back to an ICMP echo of the URL's host.
/// - `host:port` without a scheme is a TCP connect check.
/// - anything else (hostname or IP literal) is an ICMP echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Http(Url),
    Https(Url),
    Tcp { host: String, port: u16 },
    Icmp { host: String },
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid(raw, "empty host"));
        }

        // Bare IPv6 literals contain ':' but carry no port
        if raw.parse::<IpAddr>().is_ok() {
            return Ok(Target::Icmp { host: raw.to_string() });
        }

        let url = if raw.contains("://") {
            Url::parse(raw)
        } else if raw.contains(':') {
            Url::parse(&format!("telnet://{raw}"))
        } else {
            Url::parse(&format!("icmp://{raw}"))
        }
        .map_err(|e| invalid(raw, e))?;

        let host = hostname(&url).ok_or_else(|| invalid(raw, "missing host"))?;

        let target = match url.scheme() {
            "http" => Target::Http(url),
            "https" => Target::Https(url),
            "telnet" | "tcp" => {
                let port = url.port().ok_or_else(|| invalid(raw, "missing port"))?;
                Target::Tcp { host, port }
            }
            "icmp" => Target::Icmp { host },
            other => {
                debug!(target = raw, scheme = other, "unknown scheme, falling back to ICMP");
                Target::Icmp { host }
            }
        };

        Ok(target)
    }

    pub fn check_type(&self) -> CheckType {
        match self {
            Target::Http(_) => CheckType::Http,
            Target::Https(_) => CheckType::Https,
            Target::Tcp { .. } => CheckType::Tcp,
            Target::Icmp { .. } => CheckType::Icmp,
        }
    }

    /// Host name or IP literal without brackets, scheme or port
    pub fn hostname(&self) -> String {
        match self {
            Target::Http(url) | Target::Https(url) => hostname(url).unwrap_or_default(),
            Target::Tcp { host, .. } | Target::Icmp { host } => host.clone(),
        }
    }
}

fn hostname(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) if !domain.is_empty() => Some(domain.to_string()),
        Host::Domain(_) => None,
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

fn invalid(target: &str, reason: impl std::fmt::Display) -> ProbeError {
    ProbeError::InvalidTarget { target: target.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_hostname_is_icmp() {
        let target = Target::parse("example.com").unwrap();
        assert_eq!(target, Target::Icmp { host: "example.com".to_string() });
    }

    #[test]
    fn test_ip_literals_are_icmp() {
        assert_eq!(Target::parse("10.1.2.3").unwrap().check_type(), CheckType::Icmp);
        assert_eq!(
            Target::parse("fe80::1").unwrap(),
            Target::Icmp { host: "fe80::1".to_string() }
        );
    }

    #[test]
    fn test_host_port_is_tcp() {
        let target = Target::parse("example.com:443").unwrap();
        assert_eq!(target, Target::Tcp { host: "example.com".to_string(), port: 443 });
    }

    #[test]
    fn test_bracketed_ipv6_with_port_is_tcp() {
        let target = Target::parse("[::1]:8080").unwrap();
        assert_eq!(target, Target::Tcp { host: "::1".to_string(), port: 8080 });
    }

    #[test]
    fn test_explicit_schemes() {
        assert_eq!(Target::parse("http://example.com/health").unwrap().check_type(), CheckType::Http);
        assert_eq!(Target::parse("https://example.com").unwrap().check_type(), CheckType::Https);
        assert_eq!(
            Target::parse("telnet://db.internal:5432").unwrap(),
            Target::Tcp { host: "db.internal".to_string(), port: 5432 }
        );
        assert_eq!(
            Target::parse("icmp://router.lan").unwrap(),
            Target::Icmp { host: "router.lan".to_string() }
        );
    }

    #[test]
    fn test_unknown_scheme_falls_back_to_icmp() {
        let target = Target::parse("ftp://files.example.com/pub").unwrap();
        assert_eq!(target, Target::Icmp { host: "files.example.com".to_string() });
    }

    #[test]
    fn test_telnet_without_port_is_invalid() {
        let result = Target::parse("telnet://example.com");
        assert!(matches!(result, Err(ProbeError::InvalidTarget { .. })));
    }

    #[test]
    fn test_empty_and_malformed_targets() {
        assert!(Target::parse("   ").is_err());
        assert!(Target::parse("example.com:notaport").is_err());
        assert!(Target::parse("http://").is_err());
    }

    #[test]
    fn test_hostname_strips_scheme_and_port() {
        let target = Target::parse("https://status.example.com:8443/ping").unwrap();
        assert_eq!(target.hostname(), "status.example.com");
    }
}
