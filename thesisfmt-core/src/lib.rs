// Thesisfmt Core Library
//
// Checks .docx theses against an institutional formatting guide.
// Main interface: Analyzer turns a package plus a style guide into an AnalysisResult.

pub mod casefold;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod loader;
pub mod processor;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod segmentation;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use config::{Locale, StyleGuideConfig};
pub use error::{AnalyzeError, ConfigError, LoadError};
pub use loader::{DocxLoader, Loader};
pub use processor::{Analyzer, PipelineStages, StepProfiler};
pub use report::{Report, ReportEnvelope};
