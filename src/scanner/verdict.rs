//! Scan outcomes.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::inference::Prediction;

/// Which heuristic flagged a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum HeuristicHit {
    TooLong { length: usize, max: usize },
    Keyword { keyword: String },
}

impl fmt::Display for HeuristicHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicHit::TooLong { length, max } => {
                write!(f, "URL is {length} characters, limit {max}")
            }
            HeuristicHit::Keyword { keyword } => write!(f, "contains '{keyword}'"),
        }
    }
}

/// Result of checking one URL, in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ScanVerdict {
    /// No host could be extracted.
    Invalid { input: String },
    /// The host does not resolve.
    DomainNotFound { url: String },
    /// A heuristic rule matched.
    Dangerous { url: String, hit: HeuristicHit },
    /// The host is on the suspicious-domain list.
    Suspicious { url: String },
    /// Reachable with status 200 and classified by the model.
    Classified { url: String, prediction: Prediction },
    /// Reachable with status 200, but no model is loaded.
    Reachable { url: String },
    /// Reachable over HTTP with a status other than 200.
    HttpIssue { url: String, status: u16 },
    /// Neither HTTPS nor HTTP answered.
    Unreachable { url: String },
}

impl ScanVerdict {
    /// True for verdicts that should block or warn.
    pub fn is_threat(&self) -> bool {
        !matches!(
            self,
            ScanVerdict::Classified {
                prediction: Prediction::Safe,
                ..
            } | ScanVerdict::Reachable { .. }
        )
    }
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanVerdict::Invalid { input } => {
                write!(f, "'{input}' is DANGEROUS (invalid URL format)")
            }
            ScanVerdict::DomainNotFound { url } => {
                write!(f, "Website '{url}' is DANGEROUS (domain does not exist).")
            }
            ScanVerdict::Dangerous { url, hit } => {
                write!(f, "Website '{url}' is DANGEROUS ({hit}).")
            }
            ScanVerdict::Suspicious { url } => {
                write!(f, "Website '{url}' is SUSPICIOUS (proceed with caution).")
            }
            ScanVerdict::Classified { url, prediction } => {
                write!(f, "Website '{url}' is {prediction}.")
            }
            ScanVerdict::Reachable { url } => {
                write!(f, "Website '{url}' is reachable (no model loaded).")
            }
            ScanVerdict::HttpIssue { url, status } => {
                write!(f, "Website '{url}' MIGHT BE DANGEROUS (HTTP status {status}).")
            }
            ScanVerdict::Unreachable { url } => {
                write!(f, "Website '{url}' is DANGEROUS (not reachable).")
            }
        }
    }
}

/// Result of an IP lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLookup {
    pub host: String,
    pub ip: Option<IpAddr>,
}

impl fmt::Display for IpLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            Some(ip) => write!(f, "The IP address of '{}' is {ip}.", self.host),
            None => write!(
                f,
                "DNS cannot be recognized for the domain '{}'. It may not exist.",
                self.host
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let verdict = ScanVerdict::Classified {
            url: "https://example.com".to_string(),
            prediction: Prediction::Safe,
        };
        assert_eq!(verdict.to_string(), "Website 'https://example.com' is SAFE.");
        assert!(!verdict.is_threat());

        let verdict = ScanVerdict::Dangerous {
            url: "http://a.com/login".to_string(),
            hit: HeuristicHit::Keyword {
                keyword: "login".to_string(),
            },
        };
        assert!(verdict.to_string().contains("contains 'login'"));
        assert!(verdict.is_threat());
    }

    #[test]
    fn test_json_shape() {
        let verdict = ScanVerdict::HttpIssue {
            url: "http://a.com".to_string(),
            status: 404,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["verdict"], "http_issue");
        assert_eq!(json["status"], 404);
    }

    #[test]
    fn test_ip_lookup_display() {
        let lookup = IpLookup {
            host: "example.com".to_string(),
            ip: Some(IpAddr::from([93, 184, 216, 34])),
        };
        assert_eq!(lookup.to_string(), "The IP address of 'example.com' is 93.184.216.34.");
    }
}
