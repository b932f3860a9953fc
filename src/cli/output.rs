//! Output formatting for CLI commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, UrlGuardArgs};
use crate::dataset::Label;
use crate::error::Result;
use crate::inference::Prediction;
use crate::ml::metrics::EvaluationReport;
use crate::ml::search::GridSearchResult;
use crate::scanner::ScanVerdict;

/// Result structure for a training run.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub output_dir: String,
    pub n_samples: usize,
    pub vocabulary_size: usize,
    pub search: GridSearchResult,
    pub evaluation: EvaluationReport,
}

impl fmt::Display for TrainingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.evaluation)?;
        writeln!(f)?;
        writeln!(
            f,
            "Selected alpha {} (cross-validation accuracy {:.4})",
            self.search.best_alpha, self.search.best_score
        )?;
        write!(f, "Model and vectorizer saved to {}", self.output_dir)
    }
}

/// One classified URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlPrediction {
    pub url: String,
    pub label: Label,
    pub prediction: Prediction,
}

/// Result structure for prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResults {
    pub predictions: Vec<UrlPrediction>,
}

impl fmt::Display for PredictionResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.predictions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", p.url, p.prediction)?;
        }
        Ok(())
    }
}

/// One scanned URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResult {
    /// URL as given on the command line.
    pub target: String,
    #[serde(flatten)]
    pub verdict: ScanVerdict,
}

/// Result structure for scanning.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResults {
    pub results: Vec<ScanResult>,
}

impl fmt::Display for ScanResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.results.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", r.verdict)?;
        }
        Ok(())
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + fmt::Display>(result: &T, args: &UrlGuardArgs) -> Result<()> {
    println!("{}", render(result, args)?);
    Ok(())
}

/// Render a result in the specified format.
pub fn render<T: Serialize + fmt::Display>(result: &T, args: &UrlGuardArgs) -> Result<String> {
    Ok(match args.output_format {
        OutputFormat::Human => result.to_string(),
        OutputFormat::Json if args.pretty => serde_json::to_string_pretty(result)?,
        OutputFormat::Json => serde_json::to_string(result)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> UrlGuardArgs {
        let mut argv = vec!["urlguard"];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["ip", "example.com"]);
        UrlGuardArgs::try_parse_from(argv).unwrap()
    }

    fn predictions() -> PredictionResults {
        PredictionResults {
            predictions: vec![
                UrlPrediction {
                    url: "http://good.com".to_string(),
                    label: 0,
                    prediction: Prediction::Safe,
                },
                UrlPrediction {
                    url: "http://bad.ru".to_string(),
                    label: 1,
                    prediction: Prediction::Malicious,
                },
            ],
        }
    }

    #[test]
    fn test_render_human() {
        let text = render(&predictions(), &args(&[])).unwrap();
        assert_eq!(text, "http://good.com: SAFE\nhttp://bad.ru: MALICIOUS");
    }

    #[test]
    fn test_render_json() {
        let text = render(&predictions(), &args(&["--format", "json"])).unwrap();
        assert!(!text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["predictions"][1]["prediction"], "malicious");

        let pretty = render(&predictions(), &args(&["--format", "json", "--pretty"])).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_scan_result_json_is_flat() {
        let results = ScanResults {
            results: vec![ScanResult {
                target: "x.com".to_string(),
                verdict: ScanVerdict::Unreachable {
                    url: "http://x.com".to_string(),
                },
            }],
        };
        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["results"][0]["verdict"], "unreachable");
    }
}
