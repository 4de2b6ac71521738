// Error taxonomy for the checking pipeline
//
// Only loading and configuration can fail. Everything wrong with the
// document itself is reported as a Finding, never as an error.

use thiserror::Error;

/// Fatal failures while opening a `.docx` package
#[derive(Error, Debug)]
pub enum LoadError {
    /// Not a readable zip package, or a part inside it is corrupt
    #[error("Malformed package: {0}")]
    MalformedPackage(String),

    /// A readable package that lacks the parts a word-processing document needs
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input file could not be read at all
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for LoadError {
    fn from(err: zip::result::ZipError) -> Self {
        LoadError::MalformedPackage(err.to_string())
    }
}

impl From<quick_xml::Error> for LoadError {
    fn from(err: quick_xml::Error) -> Self {
        LoadError::MalformedPackage(format!("XML parse error: {err}"))
    }
}

/// Invalid style-guide configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Everything that can stop an analysis run
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
