//! Command implementations for the urlguard CLI.

use std::sync::Arc;

use log::info;
use tokio::runtime::Runtime;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::inference::{self, Prediction, UrlClassifier};
use crate::ml::trainer::Trainer;
use crate::scanner::{ScanPolicy, Scanner};

/// Execute a CLI command.
pub fn execute_command(args: UrlGuardArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::Scan(scan_args) => scan(scan_args, &args),
        Command::Ip(ip_args) => lookup_ip(ip_args, &args),
    }
}

/// Train a classifier and save the artifact pair.
fn train(args: &TrainArgs, cli_args: &UrlGuardArgs) -> Result<()> {
    let config = args.training_config()?;
    let dataset = Dataset::from_csv_path(&args.dataset)?;
    info!(
        "loaded {} rows from {}",
        dataset.len(),
        args.dataset.display()
    );

    let outcome = Trainer::new(config)?.train(&dataset)?;
    let search = outcome.search.clone();
    let evaluation = outcome.evaluation.clone();
    let vocabulary_size = outcome.vectorizer.vocabulary_size();

    outcome.into_artifacts()?.save(&args.output)?;

    output_result(
        &TrainingSummary {
            output_dir: args.output.display().to_string(),
            n_samples: dataset.len(),
            vocabulary_size,
            search,
            evaluation,
        },
        cli_args,
    )
}

/// Classify each URL with the saved model.
fn predict(args: &PredictArgs, cli_args: &UrlGuardArgs) -> Result<()> {
    let classifier = inference::init_global(&args.models)?;

    let predictions = args
        .urls
        .iter()
        .map(|url| {
            let label = classifier.predict(url)?;
            Ok(UrlPrediction {
                url: url.clone(),
                label,
                prediction: Prediction::from_label(label),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    output_result(&PredictionResults { predictions }, cli_args)
}

/// Run the layered scanner over a comma-separated URL list.
fn scan(args: &ScanArgs, cli_args: &UrlGuardArgs) -> Result<()> {
    let policy = load_policy(args.policy.as_deref())?;
    let classifier: Option<Arc<UrlClassifier>> = match &args.models {
        Some(dir) => Some(inference::init_global(dir)?),
        None => {
            info!("no model directory given; reachable URLs will not be classified");
            None
        }
    };

    let scanner = Scanner::with_network(policy, classifier)?;
    let results = Runtime::new()?.block_on(scanner.check_batch(&args.urls))?;

    output_result(
        &ScanResults {
            results: results
                .into_iter()
                .map(|(target, verdict)| ScanResult { target, verdict })
                .collect(),
        },
        cli_args,
    )
}

/// Resolve a host to its IP address.
fn lookup_ip(args: &IpArgs, cli_args: &UrlGuardArgs) -> Result<()> {
    let scanner = Scanner::with_network(ScanPolicy::default(), None)?;
    let lookup = Runtime::new()?.block_on(scanner.lookup_ip(&args.host))?;
    output_result(&lookup, cli_args)
}

fn load_policy(path: Option<&std::path::Path>) -> Result<ScanPolicy> {
    match path {
        Some(path) => {
            info!("loading scan policy from {}", path.display());
            ScanPolicy::from_json_file(path)
        }
        None => Ok(ScanPolicy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn write_dataset(dir: &TempDir) -> std::path::PathBuf {
        let mut csv = String::from("url,label\n");
        for i in 0..10 {
            csv.push_str(&format!("http://shop{i}.example.com/home,0\n"));
            csv.push_str(&format!("http://secure-login{i}.ru/verify,1\n"));
        }
        let path = dir.path().join("urls.csv");
        fs::write(&path, csv).unwrap();
        path
    }

    #[test]
    fn test_train_command_writes_artifacts() {
        let dir = TempDir::new().unwrap();
        let dataset = write_dataset(&dir);
        let output = dir.path().join("models");

        let args = UrlGuardArgs::try_parse_from([
            "urlguard",
            "-q",
            "--format",
            "json",
            "train",
            "--dataset",
            dataset.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        execute_command(args).unwrap();

        assert!(output.join(crate::ml::VECTORIZER_FILE).exists());
        assert!(output.join(crate::ml::MODEL_FILE).exists());
        UrlClassifier::load(&output).unwrap();
    }

    #[test]
    fn test_train_command_missing_column() {
        let dir = TempDir::new().unwrap();
        let dataset = dir.path().join("bad.csv");
        fs::write(&dataset, "link,label\nhttp://a.com,0\n").unwrap();

        let args = UrlGuardArgs::try_parse_from([
            "urlguard",
            "train",
            "--dataset",
            dataset.to_str().unwrap(),
            "--output",
            dir.path().join("out").to_str().unwrap(),
        ])
        .unwrap();
        let err = execute_command(args).unwrap_err();
        assert!(matches!(err, crate::error::UrlGuardError::Config(_)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_load_policy_default() {
        assert_eq!(load_policy(None).unwrap(), ScanPolicy::default());
    }
}
