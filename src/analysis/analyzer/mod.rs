//! Analyzer implementations that combine tokenizers and filters.

mod analyzer;
mod config;
mod pipeline;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use pipeline::PipelineAnalyzer;
