use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use urlguard::analysis::analyzer::AnalyzerConfig;
use urlguard::error::{Result, UrlGuardError};
use urlguard::inference::{Prediction, UrlClassifier};
use urlguard::ml::{MultinomialNaiveBayes, TfIdfVectorizer};
use urlguard::scanner::{HeuristicHit, Probe, ScanPolicy, ScanVerdict, Scanner};

/// In-memory probe: known hosts resolve, known URLs answer with a status.
#[derive(Default)]
struct FakeProbe {
    hosts: HashMap<String, IpAddr>,
    statuses: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl FakeProbe {
    fn host(mut self, host: &str) -> Self {
        self.hosts.insert(host.to_string(), IpAddr::from([10, 0, 0, 1]));
        self
    }

    fn status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Probe for FakeProbe {
    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>> {
        self.calls.lock().unwrap().push(format!("dns {host}"));
        Ok(self.hosts.get(host).copied())
    }

    async fn fetch_status(&self, url: &str) -> Result<u16> {
        self.calls.lock().unwrap().push(format!("get {url}"));
        self.statuses
            .get(url)
            .copied()
            .ok_or_else(|| UrlGuardError::network(format!("connection refused: {url}")))
    }
}

fn classifier() -> Arc<UrlClassifier> {
    let urls = [
        "https://good.com",
        "https://safe.org",
        "http://evil.ru",
        "http://malware.ru",
    ];
    let mut vectorizer = TfIdfVectorizer::new(AnalyzerConfig::default()).unwrap();
    let x = vectorizer.fit_transform(&urls).unwrap();
    let model = MultinomialNaiveBayes::fit(&x, &[0, 0, 1, 1], 1.0).unwrap();
    Arc::new(UrlClassifier::new(vectorizer, model).unwrap())
}

fn scanner(probe: &Arc<FakeProbe>, with_model: bool) -> Scanner<Arc<FakeProbe>> {
    let classifier = with_model.then(classifier);
    Scanner::new(ScanPolicy::default(), classifier, Arc::clone(probe)).unwrap()
}

#[test]
fn test_invalid_input() {
    let probe = Arc::new(FakeProbe::default());
    let verdict = tokio_test::block_on(scanner(&probe, true).check("http://")).unwrap();

    assert!(matches!(verdict, ScanVerdict::Invalid { .. }));
    assert!(probe.calls().is_empty());
}

#[test]
fn test_unknown_domain_stops_before_http() {
    let probe = Arc::new(FakeProbe::default().status("https://nowhere.invalid", 200));
    let verdict = tokio_test::block_on(scanner(&probe, true).check("nowhere.invalid")).unwrap();

    assert_eq!(
        verdict,
        ScanVerdict::DomainNotFound {
            url: "nowhere.invalid".to_string()
        }
    );
    assert_eq!(probe.calls(), vec!["dns nowhere.invalid"]);
}

#[test]
fn test_heuristics_run_after_dns() {
    let probe = Arc::new(FakeProbe::default().host("good.com"));
    let scanner = scanner(&probe, true);

    let verdict = tokio_test::block_on(scanner.check("http://good.com/login")).unwrap();
    assert_eq!(
        verdict,
        ScanVerdict::Dangerous {
            url: "http://good.com/login".to_string(),
            hit: HeuristicHit::Keyword {
                keyword: "login".to_string()
            },
        }
    );

    let long = format!("http://good.com/{}", "a".repeat(80));
    let verdict = tokio_test::block_on(scanner.check(&long)).unwrap();
    assert!(matches!(
        verdict,
        ScanVerdict::Dangerous {
            hit: HeuristicHit::TooLong { max: 75, .. },
            ..
        }
    ));
    assert!(probe.calls().iter().all(|call| call.starts_with("dns")));
}

#[test]
fn test_suspicious_domain() {
    let probe = Arc::new(
        FakeProbe::default()
            .host("phishing-site.com")
            .status("https://phishing-site.com", 200),
    );
    let verdict = tokio_test::block_on(scanner(&probe, true).check("phishing-site.com")).unwrap();

    assert!(matches!(verdict, ScanVerdict::Suspicious { .. }));
}

#[test]
fn test_https_reachable_consults_model() {
    let probe = Arc::new(
        FakeProbe::default()
            .host("good.com")
            .host("evil.ru")
            .status("https://good.com", 200)
            .status("https://evil.ru", 200),
    );
    let scanner = scanner(&probe, true);

    let verdict = tokio_test::block_on(scanner.check("good.com")).unwrap();
    assert_eq!(
        verdict,
        ScanVerdict::Classified {
            url: "https://good.com".to_string(),
            prediction: Prediction::Safe,
        }
    );

    let verdict = tokio_test::block_on(scanner.check("https://evil.ru/index.html")).unwrap();
    assert_eq!(
        verdict,
        ScanVerdict::Classified {
            url: "https://evil.ru".to_string(),
            prediction: Prediction::Malicious,
        }
    );
}

#[test]
fn test_http_fallback_consults_model() {
    let probe = Arc::new(FakeProbe::default().host("evil.ru").status("http://evil.ru", 200));
    let verdict = tokio_test::block_on(scanner(&probe, true).check("evil.ru")).unwrap();

    assert_eq!(
        verdict,
        ScanVerdict::Classified {
            url: "http://evil.ru".to_string(),
            prediction: Prediction::Malicious,
        }
    );
    assert_eq!(
        probe.calls(),
        vec!["dns evil.ru", "get https://evil.ru", "get http://evil.ru"]
    );
}

#[test]
fn test_reachable_without_model() {
    let probe = Arc::new(FakeProbe::default().host("good.com").status("https://good.com", 200));
    let verdict = tokio_test::block_on(scanner(&probe, false).check("good.com")).unwrap();

    assert_eq!(
        verdict,
        ScanVerdict::Reachable {
            url: "https://good.com".to_string()
        }
    );
}

#[test]
fn test_http_issue_and_unreachable() {
    let probe = Arc::new(
        FakeProbe::default()
            .host("broken.com")
            .host("offline.com")
            .status("https://broken.com", 503)
            .status("http://broken.com", 404),
    );
    let scanner = scanner(&probe, true);

    let verdict = tokio_test::block_on(scanner.check("broken.com")).unwrap();
    assert_eq!(
        verdict,
        ScanVerdict::HttpIssue {
            url: "http://broken.com".to_string(),
            status: 404,
        }
    );

    let verdict = tokio_test::block_on(scanner.check("offline.com")).unwrap();
    assert_eq!(
        verdict,
        ScanVerdict::Unreachable {
            url: "http://offline.com".to_string()
        }
    );
}

#[test]
fn test_check_batch_keeps_order() {
    let probe = Arc::new(FakeProbe::default().host("good.com").status("https://good.com", 200));
    let results =
        tokio_test::block_on(scanner(&probe, true).check_batch(" good.com , ,unknown.example ")).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "good.com");
    assert!(matches!(results[0].1, ScanVerdict::Classified { .. }));
    assert_eq!(results[1].0, "unknown.example");
    assert!(matches!(results[1].1, ScanVerdict::DomainNotFound { .. }));
}

#[test]
fn test_lookup_ip() {
    let probe = Arc::new(FakeProbe::default().host("good.com"));
    let scanner = scanner(&probe, false);

    let lookup = tokio_test::block_on(scanner.lookup_ip("https://good.com/path")).unwrap();
    assert_eq!(lookup.host, "good.com");
    assert_eq!(lookup.ip, Some(IpAddr::from([10, 0, 0, 1])));

    let lookup = tokio_test::block_on(scanner.lookup_ip("missing.example")).unwrap();
    assert_eq!(lookup.ip, None);
    assert!(lookup.to_string().contains("may not exist"));

    assert!(tokio_test::block_on(scanner.lookup_ip("  ")).is_err());
}

#[test]
fn test_custom_policy() {
    let policy = ScanPolicy {
        max_url_length: 200,
        suspicious_pattern: "(?i)wallet".to_string(),
        suspicious_domains: vec![],
        ..ScanPolicy::default()
    };
    let probe = Arc::new(FakeProbe::default().host("a.com").status("https://a.com", 200));
    let scanner = Scanner::new(policy, None, Arc::clone(&probe)).unwrap();

    let verdict = tokio_test::block_on(scanner.check("http://a.com/login")).unwrap();
    assert!(matches!(verdict, ScanVerdict::Reachable { .. }));

    let verdict = tokio_test::block_on(scanner.check("http://a.com/WALLET")).unwrap();
    assert!(matches!(verdict, ScanVerdict::Dangerous { .. }));
}
