//! Network probes used by the scanner.

use std::net::IpAddr;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::{Result, UrlGuardError};
use crate::scanner::policy::ScanPolicy;

/// DNS and HTTP access the scanner depends on.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Resolve `host` to an address, or `None` if it does not exist.
    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>>;

    /// Issue a GET and return the response status code.
    async fn fetch_status(&self, url: &str) -> Result<u16>;
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for std::sync::Arc<P> {
    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>> {
        (**self).resolve(host).await
    }

    async fn fetch_status(&self, url: &str) -> Result<u16> {
        (**self).fetch_status(url).await
    }
}

/// Probe backed by the system resolver and a reqwest client.
#[derive(Debug, Clone)]
pub struct NetworkProbe {
    client: Client,
}

impl NetworkProbe {
    pub fn new(policy: &ScanPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(policy.request_timeout())
            .danger_accept_invalid_certs(policy.accept_invalid_certs)
            .build()
            .map_err(|e| UrlGuardError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(NetworkProbe { client })
    }
}

#[async_trait]
impl Probe for NetworkProbe {
    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>> {
        match tokio::net::lookup_host((host, 0)).await {
            Ok(addrs) => {
                let addrs: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
                // IPv4 first, as most resolvers report it
                Ok(addrs
                    .iter()
                    .find(|ip| ip.is_ipv4())
                    .or_else(|| addrs.first())
                    .copied())
            }
            Err(e) => {
                debug!("resolving {host} failed: {e}");
                Ok(None)
            }
        }
    }

    async fn fetch_status(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UrlGuardError::network(format!("GET {url} failed: {e}")))?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_policy() {
        NetworkProbe::new(&ScanPolicy::default()).unwrap();
    }

    #[test]
    fn test_resolve_ip_literal() {
        let probe = NetworkProbe::new(&ScanPolicy::default()).unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let ip = rt.block_on(probe.resolve("127.0.0.1")).unwrap();
        assert_eq!(ip, Some(IpAddr::from([127, 0, 0, 1])));
    }
}
