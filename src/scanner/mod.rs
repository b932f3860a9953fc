//! Layered URL checks: DNS, heuristics, blocklist, reachability, model.
//!
//! [`Scanner::check`] stops at the first check that yields a verdict:
//!
//! 1. no host → [`ScanVerdict::Invalid`]
//! 2. host does not resolve → [`ScanVerdict::DomainNotFound`]
//! 3. too long or keyword match → [`ScanVerdict::Dangerous`]
//! 4. host on the suspicious list → [`ScanVerdict::Suspicious`]
//! 5. `https://host` answers 200 → model verdict on that URL
//! 6. `http://host` answers 200 → model verdict on that URL
//! 7. `http://host` answers otherwise → [`ScanVerdict::HttpIssue`]
//! 8. no answer → [`ScanVerdict::Unreachable`]

pub mod policy;
pub mod probe;
pub mod verdict;

use std::sync::Arc;

use log::{info, warn};
use regex::Regex;
use url::Url;

pub use policy::ScanPolicy;
pub use probe::{NetworkProbe, Probe};
pub use verdict::{HeuristicHit, IpLookup, ScanVerdict};

use crate::error::{Result, UrlGuardError};
use crate::inference::{Prediction, UrlClassifier};

/// Split comma-separated input into trimmed, non-empty URLs.
pub fn split_batch(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Host part of user input.
///
/// Input with a scheme is parsed as a URL. Bare input such as
/// `example.com/path` is taken up to the first `/`.
pub fn extract_host(input: &str) -> Option<String> {
    let input = input.trim();
    if input.contains("://") {
        return Url::parse(input)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .filter(|host| !host.is_empty());
    }
    let host = input.split('/').next().unwrap_or_default().trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Runs the layered checks with a given probe.
pub struct Scanner<P: Probe = NetworkProbe> {
    policy: ScanPolicy,
    pattern: Regex,
    classifier: Option<Arc<UrlClassifier>>,
    probe: P,
}

impl Scanner<NetworkProbe> {
    /// Scanner that talks to the real network.
    pub fn with_network(policy: ScanPolicy, classifier: Option<Arc<UrlClassifier>>) -> Result<Self> {
        let probe = NetworkProbe::new(&policy)?;
        Scanner::new(policy, classifier, probe)
    }
}

impl<P: Probe> Scanner<P> {
    pub fn new(
        policy: ScanPolicy,
        classifier: Option<Arc<UrlClassifier>>,
        probe: P,
    ) -> Result<Self> {
        policy.validate()?;
        let pattern = policy.compile_pattern()?;
        Ok(Scanner {
            policy,
            pattern,
            classifier,
            probe,
        })
    }

    /// Static rules applied to the full URL text.
    pub fn heuristic(&self, url: &str) -> Option<HeuristicHit> {
        let length = url.chars().count();
        if length > self.policy.max_url_length {
            return Some(HeuristicHit::TooLong {
                length,
                max: self.policy.max_url_length,
            });
        }
        self.pattern.find(url).map(|m| HeuristicHit::Keyword {
            keyword: m.as_str().to_string(),
        })
    }

    /// Check one URL.
    ///
    /// Probe failures become verdicts; only resolver and model errors are
    /// returned as errors.
    pub async fn check(&self, url: &str) -> Result<ScanVerdict> {
        let url = url.trim();
        let Some(host) = extract_host(url) else {
            warn!("invalid URL format: {url}");
            return Ok(ScanVerdict::Invalid {
                input: url.to_string(),
            });
        };

        if self.probe.resolve(&host).await?.is_none() {
            warn!("{url}: domain {host} does not exist");
            return Ok(ScanVerdict::DomainNotFound {
                url: url.to_string(),
            });
        }

        if let Some(hit) = self.heuristic(url) {
            warn!("{url}: flagged by heuristics ({hit})");
            return Ok(ScanVerdict::Dangerous {
                url: url.to_string(),
                hit,
            });
        }

        if self.policy.is_suspicious_domain(&host) {
            warn!("{url}: {host} is on the suspicious list");
            return Ok(ScanVerdict::Suspicious {
                url: url.to_string(),
            });
        }

        let https_url = format!("https://{host}");
        match self.probe.fetch_status(&https_url).await {
            Ok(200) => return self.classify(https_url),
            Ok(status) => info!("{https_url} returned {status}"),
            Err(e) => warn!("{https_url} is not reachable: {e}"),
        }

        let http_url = format!("http://{host}");
        let verdict = match self.probe.fetch_status(&http_url).await {
            Ok(200) => return self.classify(http_url),
            Ok(status) => {
                warn!("{http_url} returned a {status} status code");
                ScanVerdict::HttpIssue {
                    url: http_url,
                    status,
                }
            }
            Err(e) => {
                warn!("{http_url} is not reachable: {e}");
                ScanVerdict::Unreachable { url: http_url }
            }
        };
        Ok(verdict)
    }

    fn classify(&self, url: String) -> Result<ScanVerdict> {
        let verdict = match &self.classifier {
            Some(classifier) => {
                let prediction: Prediction = classifier.verdict(&url)?;
                ScanVerdict::Classified { url, prediction }
            }
            None => ScanVerdict::Reachable { url },
        };
        info!("{verdict}");
        Ok(verdict)
    }

    /// Check each URL of a comma-separated list, in order.
    pub async fn check_batch(&self, input: &str) -> Result<Vec<(String, ScanVerdict)>> {
        let mut results = Vec::new();
        for url in split_batch(input) {
            let verdict = self.check(&url).await?;
            results.push((url, verdict));
        }
        Ok(results)
    }

    /// Resolve the host of `input` to an IP address.
    pub async fn lookup_ip(&self, input: &str) -> Result<IpLookup> {
        let host = extract_host(input).ok_or_else(|| {
            UrlGuardError::invalid_argument(format!("no host in '{}'", input.trim()))
        })?;
        let ip = self.probe.resolve(&host).await?;
        let lookup = IpLookup { host, ip };
        info!("{lookup}");
        Ok(lookup)
    }
}
