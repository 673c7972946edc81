// Public IP lookup: a plain-text echo service tells us which address the
// outside world sees, and that address becomes a single-host CIDR.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::net::IpAddr;
use tracing::debug;

pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";

/// Something that knows this machine's public address, as a CIDR.
pub trait PublicIpSource {
    fn public_cidr(&self) -> Result<String>;
}

/// Plain-text IP echo service (ipify by default).
pub struct IpEcho {
    client: Client,
    url: String,
}

impl IpEcho {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        IpEcho {
            client,
            url: url.into(),
        }
    }
}

impl PublicIpSource for IpEcho {
    fn public_cidr(&self) -> Result<String> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("Failed to reach {}", self.url))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            bail!("Public IP lookup failed: {} - {}", status, txt);
        }
        let body = res.text().context("Reading public IP response")?;
        debug!(body = %body.trim(), "public IP service answered");
        to_cidr(&body)
    }
}

/// Turn the echo service's body into a single-address CIDR. Authorized
/// networks here are IPv4 only, so an IPv6 answer is refused.
pub fn to_cidr(body: &str) -> Result<String> {
    let body = body.trim();
    if body.is_empty() {
        bail!("Public IP service returned an empty body");
    }
    let ip: IpAddr = body
        .parse()
        .with_context(|| format!("Public IP service returned {body:?}, not an address"))?;
    match ip {
        IpAddr::V4(v4) => Ok(format!("{v4}/32")),
        IpAddr::V6(v6) => bail!("Public IP {v6} is IPv6; only IPv4 can be whitelisted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_gets_host_prefix() {
        assert_eq!(to_cidr("5.6.7.8").unwrap(), "5.6.7.8/32");
        assert_eq!(to_cidr("  5.6.7.8\n").unwrap(), "5.6.7.8/32");
    }

    #[test]
    fn test_rejects_empty_garbage_and_ipv6() {
        assert!(to_cidr("").is_err());
        assert!(to_cidr("<html>oops</html>").is_err());
        let err = to_cidr("2001:db8::1").unwrap_err();
        assert!(err.to_string().contains("IPv6"));
    }

    #[test]
    fn test_echo_answer_becomes_cidr() {
        let (url, server) = crate::test_http::serve_once("200 OK", "5.6.7.8\n");
        let cidr = IpEcho::new(crate::test_http::client(), url).public_cidr().unwrap();
        let request = server.join().unwrap();

        assert_eq!(cidr, "5.6.7.8/32");
        assert!(request.starts_with("GET / HTTP/1.1"), "{request}");
    }

    #[test]
    fn test_echo_error_status_is_error() {
        let (url, server) = crate::test_http::serve_once("503 Service Unavailable", "5.6.7.8");
        let err = IpEcho::new(crate::test_http::client(), url).public_cidr().unwrap_err();
        server.join().unwrap();
        assert!(err.to_string().contains("503"), "{err}");
    }
}
