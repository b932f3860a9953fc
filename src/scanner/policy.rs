//! Heuristic scan policy, kept outside the model so it can change without
//! retraining.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UrlGuardError};

/// Keywords that commonly appear in phishing URLs.
pub const DEFAULT_SUSPICIOUS_PATTERN: &str = "login|secure|account|verify|update|confirm|check";

/// Rules applied before any network probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPolicy {
    /// URLs longer than this (in bytes) are flagged dangerous.
    pub max_url_length: usize,
    /// URLs matching this regex are flagged dangerous.
    pub suspicious_pattern: String,
    /// Hosts reported as suspicious.
    pub suspicious_domains: Vec<String>,
    /// Per-request timeout for reachability probes.
    pub request_timeout_secs: u64,
    /// Probe hosts whose TLS certificates do not verify.
    pub accept_invalid_certs: bool,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        ScanPolicy {
            max_url_length: 75,
            suspicious_pattern: DEFAULT_SUSPICIOUS_PATTERN.to_string(),
            suspicious_domains: vec![
                "example-suspicious.com".to_string(),
                "phishing-site.com".to_string(),
            ],
            request_timeout_secs: 5,
            accept_invalid_certs: true,
        }
    }
}

impl ScanPolicy {
    /// Read a policy from a JSON file; missing keys take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            UrlGuardError::config(format!("failed to open policy {}: {e}", path.display()))
        })?;
        let policy: ScanPolicy = serde_json::from_reader(BufReader::new(file))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(UrlGuardError::config("request_timeout_secs must be positive"));
        }
        self.compile_pattern().map(|_| ())
    }

    /// Compile the suspicious-keyword regex.
    pub fn compile_pattern(&self) -> Result<Regex> {
        Regex::new(&self.suspicious_pattern).map_err(|e| {
            UrlGuardError::config(format!(
                "invalid suspicious_pattern '{}': {e}",
                self.suspicious_pattern
            ))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Host names compare case-insensitively.
    pub fn is_suspicious_domain(&self, host: &str) -> bool {
        self.suspicious_domains
            .iter()
            .any(|domain| domain.eq_ignore_ascii_case(host))
    }
}
