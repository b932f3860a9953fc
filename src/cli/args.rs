//! Command line argument parsing for the urlguard CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::AnalyzerConfig;
use crate::error::Result;
use crate::ml::config::TrainingConfig;

/// urlguard - train and apply a URL phishing classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "urlguard")]
#[command(about = "Train a URL classifier and scan links for phishing")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct UrlGuardArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl UrlGuardArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a classifier from a labeled CSV and save the artifacts
    Train(TrainArgs),

    /// Classify URLs with saved artifacts
    Predict(PredictArgs),

    /// Run the full layered check on comma-separated URLs
    Scan(ScanArgs),

    /// Resolve a host name to its IP address
    Ip(IpArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// CSV file with `url` and `label` columns
    #[arg(short, long, value_name = "CSV", env = "URLGUARD_DATASET")]
    pub dataset: PathBuf,

    /// Directory to write vectorizer.bin and model.bin to
    #[arg(short, long, value_name = "DIR", default_value = "models", env = "URLGUARD_MODELS")]
    pub output: PathBuf,

    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,

    /// Candidate smoothing strengths (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub alpha: Vec<f64>,

    /// Use character n-grams instead of word tokens, e.g. `3,5`
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_ngram_range)]
    pub char_ngrams: Option<(usize, usize)>,

    /// Score cross-validation folds one at a time
    #[arg(long)]
    pub sequential: bool,
}

impl TrainArgs {
    /// Build the training configuration: file (or defaults), then flags.
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_json_file(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(test_size) = self.test_size {
            config = config.with_test_size(test_size);
        }
        if let Some(folds) = self.folds {
            config = config.with_folds(folds);
        }
        if !self.alpha.is_empty() {
            config = config.with_alphas(self.alpha.clone());
        }
        if let Some((min_gram, max_gram)) = self.char_ngrams {
            config = config.with_analyzer(AnalyzerConfig::char_ngrams(min_gram, max_gram));
        }
        if self.sequential {
            config = config.with_parallel_folds(false);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding vectorizer.bin and model.bin
    #[arg(short, long, value_name = "DIR", default_value = "models", env = "URLGUARD_MODELS")]
    pub models: PathBuf,

    /// URLs to classify
    #[arg(value_name = "URL", required = true)]
    pub urls: Vec<String>,
}

/// Arguments for scanning
#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Directory holding vectorizer.bin and model.bin; omit to scan without a model
    #[arg(short, long, value_name = "DIR", env = "URLGUARD_MODELS")]
    pub models: Option<PathBuf>,

    /// Scan policy file (JSON)
    #[arg(short, long, value_name = "POLICY_FILE", env = "URLGUARD_POLICY")]
    pub policy: Option<PathBuf>,

    /// Comma-separated URLs
    #[arg(value_name = "URLS")]
    pub urls: String,
}

/// Arguments for IP lookup
#[derive(Parser, Debug, Clone)]
pub struct IpArgs {
    /// Host name or URL
    #[arg(value_name = "HOST")]
    pub host: String,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

fn parse_ngram_range(value: &str) -> std::result::Result<(usize, usize), String> {
    let (min, max) = value
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX, got '{value}'"))?;
    let min = min
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid MIN '{min}': {e}"))?;
    let max = max
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid MAX '{max}': {e}"))?;
    Ok((min, max))
}
